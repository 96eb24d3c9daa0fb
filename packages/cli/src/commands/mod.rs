pub mod apply;
pub mod cleanup;
pub mod defaults;
pub mod init;
pub mod list;
pub mod new;

pub use apply::{apply, ApplyArgs};
pub use cleanup::{cleanup, CleanupArgs};
pub use defaults::{defaults, DefaultsArgs};
pub use init::{init, InitArgs};
pub use list::{list, ListArgs};
pub use new::{new, NewArgs};

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use blockform_editor::{EditorContext, FormData};
use serde_json::Value;

use crate::config::{Config, IdStrategy};

/// Everything a command needs besides its own arguments
#[derive(Debug, Clone)]
pub struct Env {
    pub cwd: String,
    pub config_path: Option<PathBuf>,
    pub ids: IdStrategy,
}

impl Env {
    pub fn load_config(&self) -> Result<Config> {
        Config::load(&self.cwd, self.config_path.as_deref())
    }

    pub fn context(&self) -> Result<EditorContext> {
        Ok(self.load_config()?.context(self.ids))
    }

    /// Resolve `path` against the working directory
    pub fn path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            PathBuf::from(&self.cwd).join(path)
        }
    }
}

/// Read a JSON value from a file, or stdin for `-`
pub fn read_json(env: &Env, path: &Path) -> Result<Value> {
    let content = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        let path = env.path(path);
        fs::read_to_string(&path).with_context(|| format!("Cannot read {}", path.display()))?
    };

    serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {}", path.display()))
}

/// Read a form document; the top level must be an object
pub fn read_form(env: &Env, path: &Path) -> Result<FormData> {
    match read_json(env, path)? {
        Value::Object(form) => Ok(form),
        other => Err(anyhow!(
            "{} is not a form: expected an object, found {}",
            path.display(),
            kind(&other)
        )),
    }
}

/// Print `form`, or write it back to `path` when `in_place`
pub fn write_form(env: &Env, path: &Path, form: FormData, in_place: bool) -> Result<()> {
    let json = serde_json::to_string_pretty(&Value::Object(form))?;

    if in_place {
        if path == Path::new("-") {
            return Err(anyhow!("--in-place needs a file, not stdin"));
        }
        let path = env.path(path);
        fs::write(&path, format!("{json}\n"))?;
        tracing::info!("wrote {}", path.display());
    } else {
        println!("{json}");
    }

    Ok(())
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
