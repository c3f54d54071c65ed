use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::domain::entities::record::Process;
use crate::domain::extraction::ScanLimits;

const CONFIG_FILE_NAME: &str = "config.json";
const DEFAULT_INTERVAL_MS: u64 = 5_000;

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("br", "dar-filer", "dar-filer")
        .ok_or_else(|| anyhow!("unable to resolve config directory"))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    pub menu_label: String,
    pub code_select: String,
    pub option_atc: String,
    pub option_normal: String,
    pub option_difal: String,
    pub advance_button: String,
    pub tax_id_field: String,
    pub substitution_select: String,
    pub substitution_no: String,
    pub period_field: String,
    pub due_date_field: String,
    pub payment_date_field: String,
    pub amount_field: String,
    pub calculate_button: String,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            menu_label: "ICMS".to_string(),
            code_select: r#"select[name="j_idt43"]"#.to_string(),
            option_atc: "ICMS - ANTECIPAÇÃO PARCIAL".to_string(),
            option_normal: "113000 - ICMS - APURAÇÃO NORMAL".to_string(),
            option_difal: "ICMS - DIFERENCIAL DE ALÍQUOTA".to_string(),
            advance_button: "Avançar".to_string(),
            tax_id_field: "#fieldInscricaoEstadual".to_string(),
            substitution_select: "#cmbSubstituicao".to_string(),
            substitution_no: "NÃO".to_string(),
            period_field: r#"[id="formCasoGeral:j_idt67"]"#.to_string(),
            due_date_field: r#"[id="formCasoGeral:j_idt70:calendar_input"]"#.to_string(),
            payment_date_field: r#"[id="formCasoGeral:j_idt75:calendar_input"]"#.to_string(),
            amount_field: r#"[id="formCasoGeral:j_idt78:input"]"#.to_string(),
            calculate_button: "Calcular Imposto".to_string(),
        }
    }
}

impl PortalConfig {
    pub fn option_for(&self, process: Process) -> &str {
        match process {
            Process::Atc => &self.option_atc,
            Process::Normal => &self.option_normal,
            Process::Difal => &self.option_difal,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub interval_ms: u64,
    pub diagnostics_dir: Option<PathBuf>,
    pub scan: ScanLimits,
    pub portal: PortalConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_INTERVAL_MS,
            diagnostics_dir: None,
            scan: ScanLimits::default(),
            portal: PortalConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Reads `path`, or `config.json` in the platform config dir. A missing
    /// default file means defaults; a missing explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (project_dirs()?.config_dir().join(CONFIG_FILE_NAME), false),
        };
        if !path.exists() {
            if explicit {
                anyhow::bail!("config file not found: {}", path.display());
            }
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("failed to parse config: {}", path.display()))
    }

    pub fn diagnostics_dir(&self) -> Result<PathBuf> {
        match &self.diagnostics_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(project_dirs()?.data_local_dir().join("diagnostics")),
        }
    }
}
