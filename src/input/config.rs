use std::path::Path;

use crate::error::Result;
use crate::input::open_maybe_gz;
use crate::model::config::EvalConfig;

pub fn load_config(path: &Path) -> Result<EvalConfig> {
    let reader = open_maybe_gz(path)?;
    let mut cfg: EvalConfig = serde_json::from_reader(reader)?;
    cfg.dedup_priors();
    cfg.validate()?;
    tracing::debug!(?cfg, path = %path.display(), "loaded evaluation config");
    Ok(cfg)
}
