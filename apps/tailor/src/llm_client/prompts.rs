// Cross-cutting prompt fragments shared by every catalog template.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

pub const JOB_LISTING_HEADING: &str = "Job Listing:";
pub const RESUME_CONTENT_HEADING: &str = "Current Resume Content:";
pub const RESPONSE_FORMAT_HEADING: &str = "Response Format:";
pub const USER_PROMPT_HEADING: &str = "User Prompt:";

/// User prompt used by the optimize pipeline when the caller supplies none.
pub const DEFAULT_OPTIMIZE_PROMPT: &str = "Optimize and tailor this resume for the job listing, \
    focusing on the most relevant skills and experiences.";

/// User prompt used by job-listing extraction when the caller supplies none.
pub const DEFAULT_JOB_EXTRACTION_PROMPT: &str =
    "Extract the job listing details from this page.";

/// User prompt used by the gap-analysis route.
pub const DEFAULT_GAP_PROMPT: &str = "Identify the gaps between this resume and the job listing.";
