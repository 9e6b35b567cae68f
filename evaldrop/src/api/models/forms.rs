use serde::Deserialize;

/// Download-by-link form (`POST /download`)
#[derive(Debug, Default, Deserialize)]
pub struct DownloadForm {
    /// A viewer link, e.g. `http://host:7575/#/logs/run.eval`
    #[serde(default)]
    pub eval_url: Option<String>,
}
