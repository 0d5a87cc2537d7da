// Prompts for text refinement and resume extraction.

pub const REFINE_SYSTEM: &str = "You are an expert resume editor. \
    Rewrite the text you are given according to the instruction. \
    Keep every fact, date and number unchanged. Do not invent achievements. \
    Reply with the rewritten text only, without quotes or commentary.";

/// `{instruction}` and `{text}` are substituted before sending.
pub const REFINE_PROMPT_TEMPLATE: &str = "{instruction}:\n\n\"{text}\"";

pub const EXTRACT_SYSTEM: &str = "You are a precise resume parser. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Output shape and rules shared by the text and image extraction prompts.
macro_rules! extraction_rules {
    () => {
        r#"Return one JSON object with exactly this shape:
{
  "personalInfo": {"name": "", "email": "", "phone": "", "linkedin": "", "website": "", "address": ""},
  "summary": "",
  "experience": [
    {"company": "", "location": "", "positions": [
      {"jobTitle": "", "startDate": "", "endDate": "", "description": ""}
    ]}
  ],
  "education": [{"degree": "", "school": "", "location": "", "graduationDate": ""}],
  "skills": [""]
}

Rules:
- If a field is not present in the document, use an empty string or an empty array.
- Group consecutive positions at the same company under one company entry.
- In descriptions, put each bullet point on its own line starting with "- ".
- The address is a city and region, e.g. "San Francisco, CA"."#
    };
}

/// `{document}` is substituted with the extracted document text.
pub const EXTRACT_PROMPT_TEMPLATE: &str = concat!(
    "Extract the person's resume from the document below.\n\n",
    extraction_rules!(),
    "\n\nDOCUMENT:\n{document}"
);

/// Sent after an image of a resume; the image is the document.
pub const EXTRACT_IMAGE_PROMPT: &str = concat!(
    "Extract the person's resume from the attached image. Read all visible text.\n\n",
    extraction_rules!()
);
