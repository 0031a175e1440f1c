use regex::Regex;
use crate::error::LabelError;
use crate::models::{LabelElements, MaterialShare};

/// Label vocabulary mapped to canonical material names.
/// Longer aliases come first so alternation prefers them.
const MATERIAL_ALIASES: &[(&str, &str)] = &[
    ("recycled polyester", "recycled polyester"),
    ("organic cotton", "organic cotton"),
    ("polyurethane", "polyurethane"),
    ("elasthanne", "elastane"),
    ("polyamide", "nylon"),
    ("polyester", "polyester"),
    ("cashmere", "cashmere"),
    ("elastane", "elastane"),
    ("spandex", "elastane"),
    ("viscose", "viscose"),
    ("acrylic", "acrylic"),
    ("leather", "leather"),
    ("lyocell", "lyocell"),
    ("cotton", "cotton"),
    ("merino", "wool"),
    ("tencel", "lyocell"),
    ("linen", "linen"),
    ("rayon", "viscose"),
    ("nylon", "nylon"),
    ("lycra", "elastane"),
    ("modal", "modal"),
    ("coton", "cotton"),
    ("laine", "wool"),
    ("flax", "linen"),
    ("hemp", "hemp"),
    ("silk", "silk"),
    ("soie", "silk"),
    ("wool", "wool"),
];

const COUNTRY_ALIASES: &[(&str, &str)] = &[
    ("united kingdom", "united kingdom"),
    ("united states", "united states"),
    ("bangladesh", "bangladesh"),
    ("indonesia", "indonesia"),
    ("lithuania", "lithuania"),
    ("sri lanka", "sri lanka"),
    ("allemagne", "germany"),
    ("cambodia", "cambodia"),
    ("ethiopia", "ethiopia"),
    ("pakistan", "pakistan"),
    ("portugal", "portugal"),
    ("roumanie", "romania"),
    ("thailand", "thailand"),
    ("bulgaria", "bulgaria"),
    ("viet nam", "vietnam"),
    ("espagne", "spain"),
    ("germany", "germany"),
    ("morocco", "morocco"),
    ("myanmar", "myanmar"),
    ("romania", "romania"),
    ("tunisia", "tunisia"),
    ("turquie", "turkey"),
    ("vietnam", "vietnam"),
    ("england", "united kingdom"),
    ("france", "france"),
    ("italie", "italy"),
    ("mexico", "mexico"),
    ("poland", "poland"),
    ("turkey", "turkey"),
    ("china", "china"),
    ("chine", "china"),
    ("india", "india"),
    ("italy", "italy"),
    ("japan", "japan"),
    ("korea", "korea"),
    ("spain", "spain"),
    ("maroc", "morocco"),
    ("inde", "india"),
    ("peru", "peru"),
    ("usa", "united states"),
];

const PERCENT: &str = r"(?P<pct>\d{1,3}(?:[.,]\d+)?)\s*%";

/// Words opening a new part of the garment, e.g. "lining: 100% viscose"
const SECTION_HEADERS: &[&str] = &[
    "shell", "lining", "outer", "body", "trim", "pocket", "filling", "padding", "doublure", "exterieur",
];

fn alternation(aliases: &[(&str, &str)]) -> String {
    aliases
        .iter()
        .map(|(alias, _)| regex::escape(alias))
        .collect::<Vec<_>>()
        .join("|")
}

fn canonical<'a>(aliases: &'a [(&str, &'a str)], alias: &str) -> Option<&'a str> {
    aliases.iter().find(|(a, _)| *a == alias).map(|(_, name)| *name)
}

struct PercentMatch {
    start: usize,
    end: usize,
    name: &'static str,
    percentage: f64,
}

/// Reads materials, country and label text out of OCR output
#[derive(Debug, Clone)]
pub struct Interpreter {
    percent_first: Regex,
    material_first: Regex,
    material_mention: Regex,
    country_mention: Regex,
    made_in: Regex,
    section: Regex,
}

impl Interpreter {
    pub fn new() -> Result<Self, regex::Error> {
        let materials = alternation(MATERIAL_ALIASES);
        let countries = alternation(COUNTRY_ALIASES);

        Ok(Self {
            percent_first: Regex::new(&format!(r"{}\s*(?P<mat>{})\b", PERCENT, materials))?,
            material_first: Regex::new(&format!(r"\b(?P<mat>{})\s*:?\s*{}", materials, PERCENT))?,
            material_mention: Regex::new(&format!(r"\b(?:{})\b", materials))?,
            country_mention: Regex::new(&format!(r"\b(?:{})\b", countries))?,
            made_in: Regex::new(&format!(r"\b(?:made in|fabrique en|hecho en)\s+(?P<country>{})\b", countries))?,
            section: Regex::new(&format!(r"\b(?:{})\b", SECTION_HEADERS.join("|")))?,
        })
    }

    /// Extract label elements from the texts found on one garment.
    ///
    /// Texts are read together as one label. When several problems are
    /// found at once they are reported together.
    pub fn interpret(&self, texts: &[String]) -> Result<LabelElements, LabelError> {
        let text = normalize(&texts.join("\n"));
        if text.is_empty() {
            return Err(LabelError::TextNotFound);
        }

        let mut errors = Vec::new();

        let materials = match self.materials(&self.sections(texts)) {
            Ok(materials) => Some(materials),
            Err(err) => {
                errors.push(err);
                None
            }
        };

        let country = self.country(&text);
        if country.is_none() {
            errors.push(LabelError::CountryNotFound);
        }

        match (materials, country) {
            (Some(materials), Some(country)) => Ok(LabelElements {
                materials,
                country: country.to_string(),
                label: Some(text),
            }),
            _ if errors.len() > 1 => Err(LabelError::MultipleLabelErrors(errors)),
            _ => Err(errors.remove(0)),
        }
    }

    /// Percentage matches in one layout ("80% cotton" or "cotton 80%")
    fn percent_matches(regex: &Regex, text: &str) -> Vec<PercentMatch> {
        regex
            .captures_iter(text)
            .filter_map(|captures| {
                let whole = captures.get(0)?;
                let name = canonical(MATERIAL_ALIASES, captures.name("mat")?.as_str())?;
                let percentage = captures
                    .name("pct")?
                    .as_str()
                    .replace(',', ".")
                    .parse::<f64>()
                    .ok()
                    .filter(|pct| *pct <= 100.0)?;

                Some(PercentMatch {
                    start: whole.start(),
                    end: whole.end(),
                    name,
                    percentage,
                })
            })
            .collect()
    }

    /// Normalized lines split at section headers, blanks dropped
    fn sections(&self, texts: &[String]) -> Vec<String> {
        texts
            .iter()
            .flat_map(|text| text.lines())
            .map(normalize)
            .flat_map(|line| {
                self.section
                    .split(&line)
                    .map(|part| part.trim().to_string())
                    .filter(|part| !part.is_empty())
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    /// Percentage matches of one section, in the layout explaining more of it
    fn section_matches(&self, section: &str) -> Vec<PercentMatch> {
        let percent_first = Self::percent_matches(&self.percent_first, section);
        let material_first = Self::percent_matches(&self.material_first, section);
        if material_first.len() > percent_first.len() {
            material_first
        } else {
            percent_first
        }
    }

    fn materials(&self, sections: &[String]) -> Result<Vec<MaterialShare>, LabelError> {
        let mut shares: Vec<MaterialShare> = Vec::new();
        let mut uncovered: Vec<&str> = Vec::new();

        for section in sections {
            let matches = self.section_matches(section);
            for m in &matches {
                if !shares.iter().any(|share| share.name == m.name) {
                    shares.push(MaterialShare {
                        name: m.name.to_string(),
                        percentage: m.percentage,
                    });
                }
            }

            for mention in self.material_mention.find_iter(section) {
                let covered = matches
                    .iter()
                    .any(|m| mention.start() >= m.start && mention.end() <= m.end);
                if !covered {
                    uncovered.push(canonical(MATERIAL_ALIASES, mention.as_str()).unwrap_or(mention.as_str()));
                }
            }
        }

        // A material given a percentage elsewhere on the label is not missing one
        if let Some(name) = uncovered.iter().find(|name| !shares.iter().any(|share| share.name == **name)) {
            return Err(LabelError::MissingMaterialPercentage(name.to_string()));
        }

        if shares.is_empty() {
            return Err(LabelError::MaterialNotFound);
        }

        Ok(shares)
    }

    /// "made in X" wins; otherwise the first country mentioned
    fn country(&self, text: &str) -> Option<&'static str> {
        let alias = self
            .made_in
            .captures(text)
            .and_then(|captures| captures.name("country"))
            .or_else(|| self.country_mention.find(text))?;

        canonical(COUNTRY_ALIASES, alias.as_str())
    }
}

/// Lowercase, drop accents we know about and collapse punctuation to spaces
fn normalize(text: &str) -> String {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'é' | 'è' | 'ê' => 'e',
            'à' | 'â' => 'a',
            'ô' => 'o',
            c if c.is_alphanumeric() || matches!(c, '%' | '.' | ',') => c,
            _ => ' ',
        })
        .collect();

    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interpret(text: &str) -> Result<LabelElements, LabelError> {
        Interpreter::new().unwrap().interpret(&[text.to_string()])
    }

    #[test]
    fn test_reads_materials_and_country() {
        let elements = interpret("80% Cotton\n20% Polyamide\nMADE IN PORTUGAL").unwrap();

        assert_eq!(elements.country, "portugal");
        assert_eq!(
            elements.materials,
            vec![
                MaterialShare { name: "cotton".to_string(), percentage: 80.0 },
                MaterialShare { name: "nylon".to_string(), percentage: 20.0 },
            ]
        );
        assert_eq!(elements.label.as_deref(), Some("80% cotton 20% polyamide made in portugal"));
    }

    #[test]
    fn test_material_before_percentage() {
        let elements = interpret("Wool: 70,5% / Silk 29.5% - Made in Italy").unwrap();

        assert_eq!(elements.materials[0], MaterialShare { name: "wool".to_string(), percentage: 70.5 });
        assert_eq!(elements.materials[1], MaterialShare { name: "silk".to_string(), percentage: 29.5 });
        assert_eq!(elements.country, "italy");
    }

    #[test]
    fn test_longest_alias_wins() {
        let elements = interpret("100% recycled polyester made in vietnam").unwrap();
        assert_eq!(elements.materials[0].name, "recycled polyester");
    }

    #[test]
    fn test_made_in_beats_other_mentions() {
        let elements = interpret("designed in france 100% linen made in india").unwrap();
        assert_eq!(elements.country, "india");
    }

    #[test]
    fn test_empty_text() {
        assert_eq!(interpret("  \n ").unwrap_err(), LabelError::TextNotFound);
    }

    #[test]
    fn test_material_not_found() {
        assert_eq!(interpret("made in china").unwrap_err(), LabelError::MaterialNotFound);
    }

    #[test]
    fn test_country_not_found() {
        assert_eq!(interpret("100% cotton").unwrap_err(), LabelError::CountryNotFound);
    }

    #[test]
    fn test_missing_percentage() {
        assert_eq!(
            interpret("60% cotton and elastane made in turkey").unwrap_err(),
            LabelError::MissingMaterialPercentage("elastane".to_string())
        );
    }

    #[test]
    fn test_multiple_errors() {
        assert_eq!(
            interpret("machine wash cold").unwrap_err(),
            LabelError::MultipleLabelErrors(vec![LabelError::MaterialNotFound, LabelError::CountryNotFound])
        );
    }

    #[test]
    fn test_texts_are_read_together() {
        let elements = Interpreter::new()
            .unwrap()
            .interpret(&["100% cotton".to_string(), "made in peru".to_string()])
            .unwrap();

        assert_eq!(elements.country, "peru");
        assert_eq!(elements.materials.len(), 1);
    }

    #[test]
    fn test_layout_chosen_per_line() {
        let elements = interpret("Shell: wool 70% cashmere 30%\nLining: 100% viscose\nMade in Italy").unwrap();

        assert_eq!(
            elements.materials,
            vec![
                MaterialShare { name: "wool".to_string(), percentage: 70.0 },
                MaterialShare { name: "cashmere".to_string(), percentage: 30.0 },
                MaterialShare { name: "viscose".to_string(), percentage: 100.0 },
            ]
        );
    }

    #[test]
    fn test_layout_chosen_per_section_on_one_line() {
        let elements = interpret("Shell: 80% cotton 20% polyamide / Lining: viscose 100% - made in china").unwrap();

        assert_eq!(
            elements.materials,
            vec![
                MaterialShare { name: "cotton".to_string(), percentage: 80.0 },
                MaterialShare { name: "nylon".to_string(), percentage: 20.0 },
                MaterialShare { name: "viscose".to_string(), percentage: 100.0 },
            ]
        );
        assert_eq!(elements.country, "china");
    }
}
