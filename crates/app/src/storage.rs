//! File-backed dialogs and script sink
//!
//! Without a desktop there is nobody to answer a file dialog, so the
//! headless binary answers from the saves directory: the newest matching
//! file is "picked" and saves get a fresh timestamped name.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use dockyard_bridge::{FileDialogs, OpenedFile, ScriptSink, ServiceError};

const MODEL_EXTENSIONS: &[&str] = &["obj", "fbx", "dae"];
const SCENE_EXTENSIONS: &[&str] = &["json"];

/// Prefix of generated script modules
const SCRIPT_PREFIX: &str = "blockly_code";
/// Runner module regenerated next to the script package
const RUNNER_FILE: &str = "runScript.py";

pub struct DirectoryDialogs {
    saves_dir: PathBuf,
}

impl DirectoryDialogs {
    pub fn new(saves_dir: impl Into<PathBuf>) -> Self {
        Self {
            saves_dir: saves_dir.into(),
        }
    }

    fn newest(&self, extensions: &[&str]) -> Result<Option<PathBuf>, ServiceError> {
        let entries = match fs::read_dir(&self.saves_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(ServiceError::io(&self.saves_dir, e)),
        };

        let mut newest: Option<(SystemTime, PathBuf)> = None;
        for entry in entries {
            let entry = entry.map_err(|e| ServiceError::io(&self.saves_dir, e))?;
            let path = entry.path();
            if !has_extension(&path, extensions) {
                continue;
            }
            let modified = entry
                .metadata()
                .and_then(|meta| meta.modified())
                .map_err(|e| ServiceError::io(&path, e))?;
            let candidate = (modified, path);
            if newest.as_ref().is_none_or(|current| candidate > *current) {
                newest = Some(candidate);
            }
        }
        Ok(newest.map(|(_, path)| path))
    }

    fn save_path(&self) -> PathBuf {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or_default();
        let mut path = self.saves_dir.join(format!("scene_{stamp}.json"));
        let mut suffix = 1;
        while path.exists() {
            path = self.saves_dir.join(format!("scene_{stamp}_{suffix}.json"));
            suffix += 1;
        }
        path
    }
}

impl FileDialogs for DirectoryDialogs {
    fn pick_model(&mut self) -> Result<Option<String>, ServiceError> {
        let picked = self.newest(MODEL_EXTENSIONS)?;
        if picked.is_none() {
            tracing::info!("No model files in {}", self.saves_dir.display());
        }
        Ok(picked.map(|path| path.to_string_lossy().into_owned()))
    }

    fn open_scene(&mut self) -> Result<Option<OpenedFile>, ServiceError> {
        let Some(path) = self.newest(SCENE_EXTENSIONS)? else {
            tracing::info!("No scene files in {}", self.saves_dir.display());
            return Ok(None);
        };
        let content = fs::read_to_string(&path).map_err(|e| ServiceError::io(&path, e))?;
        Ok(Some(OpenedFile {
            path: path.to_string_lossy().into_owned(),
            content,
        }))
    }

    fn save_scene(&mut self, content: &str) -> Result<Option<String>, ServiceError> {
        fs::create_dir_all(&self.saves_dir).map_err(|e| ServiceError::io(&self.saves_dir, e))?;
        let path = self.save_path();
        fs::write(&path, content).map_err(|e| ServiceError::io(&path, e))?;
        Ok(Some(path.to_string_lossy().into_owned()))
    }
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|want| ext.eq_ignore_ascii_case(want)))
}

/// Writes scripts as modules of a package directory and keeps a runner
/// module beside the package that imports and runs all of them.
pub struct ScriptDirectory {
    script_dir: PathBuf,
}

impl ScriptDirectory {
    pub fn new(script_dir: impl Into<PathBuf>) -> Self {
        Self {
            script_dir: script_dir.into(),
        }
    }

    pub fn runner_path(&self) -> PathBuf {
        match self.script_dir.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.join(RUNNER_FILE),
            _ => PathBuf::from(RUNNER_FILE),
        }
    }

    fn package(&self) -> String {
        self.script_dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "script".to_string())
    }

    fn modules(&self) -> Result<Vec<String>, ServiceError> {
        let entries =
            fs::read_dir(&self.script_dir).map_err(|e| ServiceError::io(&self.script_dir, e))?;
        let mut modules = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| ServiceError::io(&self.script_dir, e))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            match name.strip_suffix(".py") {
                Some(stem) if stem.starts_with(SCRIPT_PREFIX) => modules.push(stem.to_string()),
                _ => {}
            }
        }
        modules.sort();
        Ok(modules)
    }

    fn write_runner(&self) -> Result<PathBuf, ServiceError> {
        let package = self.package();
        let modules = self.modules()?;

        let mut runner = String::new();
        for module in &modules {
            runner.push_str(&format!("import {package}.{module}\n"));
        }
        runner.push_str("\ndef run():\n");
        if modules.is_empty() {
            runner.push_str("    pass\n");
        }
        for module in &modules {
            runner.push_str(&format!("    {package}.{module}.run()\n"));
        }

        let path = self.runner_path();
        fs::write(&path, runner).map_err(|e| ServiceError::io(&path, e))?;
        Ok(path)
    }
}

impl ScriptSink for ScriptDirectory {
    fn write_script(&mut self, code: &str, index: u32) -> Result<PathBuf, ServiceError> {
        fs::create_dir_all(&self.script_dir).map_err(|e| ServiceError::io(&self.script_dir, e))?;
        let path = self.script_dir.join(format!("{SCRIPT_PREFIX}_{index}.py"));
        fs::write(&path, code).map_err(|e| ServiceError::io(&path, e))?;

        let runner = self.write_runner()?;
        tracing::debug!("Runner regenerated at {}", runner.display());
        Ok(path)
    }
}
