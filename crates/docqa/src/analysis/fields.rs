//! Structured field extraction from natural-language questions

use once_cell::sync::Lazy;
use regex::Regex;

static AGE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(\d{1,3})\b\s*-?(year|yr|yo|years|old|male|female)?")
        .expect("Invalid age regex")
});

static DURATION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+)[-\s]*(month|year|day|week)s?[-\s]*(old|policy)?")
        .expect("Invalid duration regex")
});

static PROCEDURE_FALLBACK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b([a-z]+) (surgery|procedure)\b").expect("Invalid procedure regex")
});

static LOCATION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bin ([A-Z][a-z]+(?: [A-Z][a-z]+)*)").expect("Invalid location regex")
});

/// Common procedures and body parts recognized in questions
const COMMON_PROCEDURES: &[&str] = &[
    "knee surgery", "hip replacement", "appendectomy", "bypass surgery", "angioplasty",
    "cataract surgery", "hernia repair", "gallbladder removal", "hysterectomy", "prostate surgery",
    "bariatric surgery", "spinal fusion", "carpal tunnel release", "colonoscopy", "endoscopy",
    "tonsillectomy", "adenoidectomy", "mastectomy", "lumpectomy", "thyroidectomy", "vasectomy",
    "cesarean section", "laparoscopy", "arthroscopy", "pacemaker implantation", "stent placement",
    "coronary angiography", "gastrectomy", "colectomy", "nephrectomy", "liver transplant",
    "kidney transplant", "lung transplant", "heart transplant", "bone marrow transplant",
    "skin graft", "cornea transplant", "retinal detachment repair", "vitrectomy", "glaucoma surgery",
    "lasik", "rhinoplasty", "septoplasty", "sinus surgery", "bunionectomy", "meniscectomy",
    "rotator cuff repair", "acl reconstruction", "shoulder replacement", "ankle fusion",
    "spinal decompression", "laminectomy", "discectomy", "microdiscectomy", "vertebroplasty",
    "kyphoplasty", "inguinal hernia repair", "femoral hernia repair", "umbilical hernia repair",
    "ventral hernia repair", "hemorrhoidectomy", "fistulotomy", "anal fissure repair",
    "gastroscopy", "sigmoidoscopy", "bronchoscopy", "cystoscopy", "ureteroscopy", "prostatectomy",
    "orchiectomy", "oophorectomy", "salpingectomy", "tubal ligation", "myomectomy",
    "endometrial ablation", "abdominoplasty", "liposuction", "breast augmentation",
    "breast reduction", "mohs surgery", "skin lesion excision", "mole removal", "circumcision",
    "varicocelectomy", "hydrocelectomy", "thyroid ablation",
    "parathyroidectomy", "adrenalectomy", "splenectomy", "pancreatectomy", "whipple procedure",
    "gastrotomy", "tracheostomy", "laryngectomy", "esophagectomy", "bowel resection",
    "eye", "shoulder", "elbow", "wrist", "hand", "finger", "thumb", "ankle", "foot", "toe",
    "neck", "back", "spine", "chest", "abdomen", "pelvis", "lung", "heart", "liver", "kidney",
    "bladder", "pancreas", "spleen", "intestine", "stomach", "ear", "nose", "throat", "jaw",
    "mouth", "teeth", "scalp", "skin", "breast", "testicle", "ovary", "uterus",
];

/// Structured fields parsed from a question
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedQuery {
    /// Patient age
    pub age: Option<String>,
    /// Medical procedure or body part
    pub procedure: Option<String>,
    /// Location name
    pub location: Option<String>,
    /// Policy duration phrase
    pub policy_duration: Option<String>,
}

/// Extract structured fields from a natural-language query
pub fn parse_query(query: &str) -> ParsedQuery {
    ParsedQuery {
        age: extract_age(query),
        procedure: extract_procedure(query),
        location: extract_location(query),
        policy_duration: extract_policy_duration(query),
    }
}

/// Extract an age-like number
fn extract_age(text: &str) -> Option<String> {
    AGE_PATTERN
        .captures_iter(text)
        .filter_map(|c| {
            let number = c.get(1)?.as_str();
            // Bare numbers qualify only when plausibly an age
            let has_suffix = c.get(2).is_some();
            let value: u32 = number.parse().ok()?;
            if has_suffix || value < 120 {
                Some(number.to_string())
            } else {
                None
            }
        })
        .next()
}

/// Extract a procedure from the known list, falling back to a
/// "<words> surgery/procedure" phrase
fn extract_procedure(text: &str) -> Option<String> {
    let text_lower = text.to_lowercase();
    for procedure in COMMON_PROCEDURES {
        if text_lower.contains(procedure) {
            return Some((*procedure).to_string());
        }
    }

    PROCEDURE_FALLBACK
        .captures(text)
        .and_then(|c| c.get(0))
        .map(|m| m.as_str().to_lowercase())
}

/// Extract a location from an "in <Place>" phrase
fn extract_location(text: &str) -> Option<String> {
    LOCATION_PATTERN
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Extract a policy duration phrase
///
/// Age phrases like "46-year-old" also match the duration shape, so a
/// match adjoining the word "policy" wins over the first one.
fn extract_policy_duration(text: &str) -> Option<String> {
    let matches: Vec<regex::Match> = DURATION_PATTERN.find_iter(text).collect();

    let preferred = matches.iter().find(|m| {
        text[m.end()..]
            .trim_start()
            .to_lowercase()
            .starts_with("policy")
            || m.as_str().to_lowercase().ends_with("policy")
    });

    preferred
        .or_else(|| matches.first())
        .map(|m| m.as_str().trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_query() {
        let parsed = parse_query("46-year-old male, knee surgery in Pune, 3-month-old policy");
        assert_eq!(parsed.age.as_deref(), Some("46"));
        assert_eq!(parsed.procedure.as_deref(), Some("knee surgery"));
        assert_eq!(parsed.location.as_deref(), Some("Pune"));
        assert_eq!(parsed.policy_duration.as_deref(), Some("3-month-old"));
    }

    #[test]
    fn test_procedure_fallback_phrase() {
        let parsed = parse_query("Is corrective jaw surgery covered under this plan?");
        // "jaw" is in the known list and wins over the fallback
        assert_eq!(parsed.procedure.as_deref(), Some("jaw"));

        let parsed = parse_query("Is the blepharoplasty procedure covered?");
        assert_eq!(parsed.procedure.as_deref(), Some("blepharoplasty procedure"));
    }

    #[test]
    fn test_implausible_age_rejected() {
        let parsed = parse_query("Claim number 20419 was filed");
        assert_eq!(parsed.age, None);
    }

    #[test]
    fn test_empty_fields_for_plain_question() {
        let parsed = parse_query("What is the waiting period?");
        assert_eq!(parsed.age, None);
        assert_eq!(parsed.procedure, None);
        assert_eq!(parsed.location, None);
        // "waiting period" carries no number, so no duration either
        assert_eq!(parsed.policy_duration, None);
    }
}
