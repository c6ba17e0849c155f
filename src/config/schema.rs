use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::insight::InsightConfig;

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Directory of `<slug>.json` datasets (defaults to ~/.config/town-insight/data)
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    #[serde(default)]
    pub insight: Option<InsightConfig>,
}
