use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("resume JSON is malformed: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("unsupported file type: {0}")]
    UnsupportedFile(String),

    #[error("could not extract text from PDF: {0}")]
    PdfExtraction(String),

    #[error("document contains no readable text")]
    EmptyDocument,
}

/// Treats an explicit `null` like a missing field.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalInfo {
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(deserialize_with = "nullable")]
    pub email: String,
    #[serde(deserialize_with = "nullable")]
    pub phone: String,
    #[serde(deserialize_with = "nullable")]
    pub linkedin: String,
    #[serde(deserialize_with = "nullable")]
    pub website: String,
    #[serde(deserialize_with = "nullable")]
    pub address: String,
    /// Data URL or remote URL of the profile photo.
    #[serde(deserialize_with = "nullable")]
    pub photo: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Position {
    #[serde(deserialize_with = "nullable")]
    pub id: String,
    #[serde(deserialize_with = "nullable")]
    pub job_title: String,
    #[serde(deserialize_with = "nullable")]
    pub start_date: String,
    #[serde(deserialize_with = "nullable")]
    pub end_date: String,
    /// Free text: paragraphs, `- ` / `* ` bullets and `**bold**` spans.
    #[serde(deserialize_with = "nullable")]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompanyExperience {
    #[serde(deserialize_with = "nullable")]
    pub id: String,
    #[serde(deserialize_with = "nullable")]
    pub company: String,
    #[serde(deserialize_with = "nullable")]
    pub location: String,
    #[serde(deserialize_with = "nullable")]
    pub positions: Vec<Position>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Education {
    #[serde(deserialize_with = "nullable")]
    pub id: String,
    #[serde(deserialize_with = "nullable")]
    pub degree: String,
    #[serde(deserialize_with = "nullable")]
    pub school: String,
    #[serde(deserialize_with = "nullable")]
    pub location: String,
    #[serde(deserialize_with = "nullable")]
    pub graduation_date: String,
}

/// A complete resume as edited by the user.
///
/// Every field is optional on input; absent or `null` values take their defaults,
/// so partial documents (older exports, model output) deserialize cleanly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResumeData {
    #[serde(deserialize_with = "nullable")]
    pub personal_info: PersonalInfo,
    #[serde(deserialize_with = "nullable")]
    pub summary: String,
    #[serde(deserialize_with = "nullable")]
    pub experience: Vec<CompanyExperience>,
    #[serde(deserialize_with = "nullable")]
    pub education: Vec<Education>,
    #[serde(deserialize_with = "nullable")]
    pub skills: Vec<String>,
}

impl ResumeData {
    /// Backfills missing ids with fresh UUIDs.
    pub fn normalize(mut self) -> Self {
        for company in &mut self.experience {
            backfill_id(&mut company.id);
            for position in &mut company.positions {
                backfill_id(&mut position.id);
            }
        }
        for education in &mut self.education {
            backfill_id(&mut education.id);
        }
        self
    }

    /// Skills with blank entries removed.
    pub fn visible_skills(&self) -> impl Iterator<Item = &str> {
        self.skills
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        let p = &self.personal_info;
        [&p.name, &p.email, &p.phone, &p.linkedin, &p.website, &p.address, &self.summary]
            .iter()
            .all(|s| s.trim().is_empty())
            && self.experience.is_empty()
            && self.education.is_empty()
            && self.visible_skills().next().is_none()
    }
}

fn backfill_id(id: &mut String) {
    if id.trim().is_empty() {
        *id = Uuid::new_v4().to_string();
    }
}

/// Parses an exported resume (or any partial resume JSON) and normalizes it.
pub fn parse_resume_json(raw: &str) -> Result<ResumeData, ImportError> {
    let data: ResumeData = serde_json::from_str(raw)?;
    Ok(data.normalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_takes_defaults() {
        let data = parse_resume_json(r#"{"personalInfo": {"name": "Ada"}, "skills": null}"#)
            .expect("valid partial resume");
        assert_eq!(data.personal_info.name, "Ada");
        assert_eq!(data.personal_info.email, "");
        assert!(data.experience.is_empty());
        assert!(data.skills.is_empty());
    }

    #[test]
    fn test_missing_ids_are_backfilled() {
        let raw = r#"{
            "experience": [{"company": "Acme", "positions": [{"jobTitle": "Engineer"}, {"id": "keep"}]}],
            "education": [{"degree": "BSc"}]
        }"#;
        let data = parse_resume_json(raw).expect("valid resume");
        let company = &data.experience[0];
        assert!(Uuid::parse_str(&company.id).is_ok());
        assert!(Uuid::parse_str(&company.positions[0].id).is_ok());
        assert_eq!(company.positions[1].id, "keep");
        assert!(Uuid::parse_str(&data.education[0].id).is_ok());
    }

    #[test]
    fn test_null_positions_become_empty() {
        let data = parse_resume_json(r#"{"experience": [{"company": "Acme", "positions": null}]}"#)
            .expect("valid resume");
        assert!(data.experience[0].positions.is_empty());
    }

    #[test]
    fn test_malformed_json_is_rejected() {
        assert!(matches!(
            parse_resume_json("{not json"),
            Err(ImportError::Malformed(_))
        ));
        assert!(matches!(parse_resume_json("[1, 2]"), Err(ImportError::Malformed(_))));
    }

    #[test]
    fn test_serializes_camel_case() {
        let mut data = ResumeData::default();
        data.education.push(Education {
            graduation_date: "2020".into(),
            ..Education::default()
        });
        let json = serde_json::to_value(&data).expect("serializable");
        assert!(json.get("personalInfo").is_some());
        assert_eq!(json["education"][0]["graduationDate"], "2020");
    }

    #[test]
    fn test_emptiness() {
        let mut data = ResumeData::default();
        assert!(data.is_empty());
        data.skills = vec!["  ".into()];
        assert!(data.is_empty());
        data.summary = "Engineer".into();
        assert!(!data.is_empty());
    }
}
