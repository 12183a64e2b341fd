use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThemeSpec {
    pub id: String,
    pub background: Option<String>,
    pub header: Option<String>,
    pub header_hint: Option<String>,
    pub header_border: Option<String>,
    pub user_label: Option<String>,
    pub user_bubble: Option<String>,
    pub bot_label: Option<String>,
    pub bot_bubble: Option<String>,
    pub loading: Option<String>,
    pub input_border: Option<String>,
    pub input_border_busy: Option<String>,
    pub input_title: Option<String>,
    pub input_text: Option<String>,
    pub placeholder: Option<String>,
    pub input_cursor_modifiers: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BuiltinThemesConfig {
    themes: Vec<ThemeSpec>,
}

pub fn load_builtin_themes() -> Vec<ThemeSpec> {
    const CONFIG_CONTENT: &str = include_str!("../builtin_themes.toml");
    let config: BuiltinThemesConfig =
        toml::from_str(CONFIG_CONTENT).expect("Failed to parse builtin_themes.toml");
    config.themes
}

pub fn find_builtin_theme(id: &str) -> Option<ThemeSpec> {
    load_builtin_themes()
        .into_iter()
        .find(|t| t.id.eq_ignore_ascii_case(id))
}
