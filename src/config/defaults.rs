use std::collections::HashMap;
use std::path::PathBuf;

use super::types::Specialist;

pub fn default_version() -> u32 {
    1
}

pub fn default_data_dir() -> PathBuf {
    PathBuf::from(".lexflow")
}

pub fn default_concurrency() -> usize {
    3
}

pub fn default_launch_delay_ms() -> u64 {
    250
}

pub fn default_timeout_sec() -> u64 {
    120
}

pub fn default_dispatch_timeout_sec() -> u64 {
    180
}

pub fn default_max_revisions() -> u32 {
    2
}

pub fn default_claude_binary() -> PathBuf {
    // Check common install location first
    if let Some(home) = std::env::var_os("HOME") {
        let local_path = PathBuf::from(home).join(".claude/local/claude");
        if local_path.exists() {
            return local_path;
        }
    }
    // Fall back to PATH lookup
    PathBuf::from("claude")
}

pub fn default_claude_model() -> String {
    "sonnet".to_string()
}

pub fn default_permission_mode() -> String {
    "default".to_string()
}

pub fn default_codex_binary() -> PathBuf {
    PathBuf::from("codex")
}

pub fn default_codex_model() -> String {
    "gpt-4.1".to_string()
}

pub fn default_max_attempts() -> u32 {
    2
}

pub fn default_backoff_base_ms() -> u64 {
    1000
}

pub fn default_gates() -> Vec<String> {
    vec!["explain".to_string()]
}

pub fn default_request_timeout_sec() -> u64 {
    86_400
}

pub fn default_poll_interval_ms() -> u64 {
    5_000
}

pub fn default_wait_timeout_sec() -> u64 {
    300
}

pub fn default_fallback_specialist() -> String {
    "general_counsel".to_string()
}

fn specialist(id: &str, name: &str, focus: &str) -> Specialist {
    Specialist {
        id: id.to_string(),
        name: name.to_string(),
        focus: focus.to_string(),
        prompt_file: None,
    }
}

pub fn default_specialists() -> Vec<Specialist> {
    vec![
        specialist(
            "criminal_defense",
            "Criminal Defense Attorney",
            "criminal charges, arrests, police interactions and defendants' rights",
        ),
        specialist(
            "housing_lawyer",
            "Housing Lawyer",
            "landlord-tenant disputes, evictions, habitability and lease terms",
        ),
        specialist(
            "tenant_rights_expert",
            "Tenant Rights Expert",
            "tenant protections, repair obligations, retaliation and rent rules",
        ),
        specialist(
            "family_lawyer",
            "Family Lawyer",
            "divorce, custody, support and domestic relations",
        ),
        specialist(
            "employment_lawyer",
            "Employment Lawyer",
            "wrongful termination, wage claims, discrimination and workplace rights",
        ),
        specialist(
            "immigration_lawyer",
            "Immigration Lawyer",
            "visas, status adjustments, removal proceedings and naturalization",
        ),
        specialist(
            "general_counsel",
            "General Counsel",
            "general legal questions that do not fit a single practice area",
        ),
    ]
}

pub fn default_routes() -> HashMap<String, Vec<String>> {
    let mut routes = HashMap::new();
    routes.insert(
        "criminal".to_string(),
        vec!["criminal_defense".to_string()],
    );
    routes.insert(
        "housing".to_string(),
        vec![
            "housing_lawyer".to_string(),
            "tenant_rights_expert".to_string(),
        ],
    );
    routes.insert("family".to_string(), vec!["family_lawyer".to_string()]);
    routes.insert(
        "employment".to_string(),
        vec!["employment_lawyer".to_string()],
    );
    routes.insert(
        "immigration".to_string(),
        vec!["immigration_lawyer".to_string()],
    );
    routes.insert("other".to_string(), vec!["general_counsel".to_string()]);
    routes
}
