use crate::model::Roster;
use anyhow::{bail, Context};
use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Persistance du roster entre deux appels de la CLI.
pub trait Storage {
    fn load(&self) -> anyhow::Result<Roster>;
    /// Remplace le contenu précédent en une seule opération.
    fn save(&self, roster: &Roster) -> anyhow::Result<()>;
}

/// Roster dans un fichier JSON local (`roster.json` par défaut).
pub struct JsonStorage {
    file: PathBuf,
}

impl JsonStorage {
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let file = path.as_ref().to_path_buf();
        if file.is_dir() {
            bail!("roster path is a directory: {}", file.display());
        }
        Ok(Self { file })
    }

    /// Roster vide tant qu'aucune commande n'a encore rien enregistré.
    pub fn load_or_default(&self) -> anyhow::Result<Roster> {
        if self.file.exists() {
            self.load()
        } else {
            debug!(file = %self.file.display(), "no roster yet, starting empty");
            Ok(Roster::default())
        }
    }

    fn target_dir(&self) -> anyhow::Result<&Path> {
        match self.file.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => {
                fs::create_dir_all(dir)
                    .with_context(|| format!("creating roster directory {}", dir.display()))?;
                Ok(dir)
            }
            _ => Ok(Path::new(".")),
        }
    }
}

/// Un roster cohérent : espacement valide, noms uniques et non vides,
/// indisponibilités rattachées à une personne connue.
fn validate(roster: &Roster) -> anyhow::Result<()> {
    roster.gap.validate()?;

    let mut names = HashSet::new();
    for person in &roster.people {
        if person.as_str().is_empty() {
            bail!("empty person name in roster");
        }
        if !names.insert(person.as_str()) {
            bail!("duplicate person in roster: {person}");
        }
    }
    if let Some(tag) = roster
        .unavailable
        .iter()
        .find(|tag| !names.contains(tag.person.as_str()))
    {
        bail!("exclusion {tag} names a person outside the roster");
    }
    Ok(())
}

impl Storage for JsonStorage {
    fn load(&self) -> anyhow::Result<Roster> {
        let raw = fs::read_to_string(&self.file)
            .with_context(|| format!("reading roster {}", self.file.display()))?;
        let roster: Roster = serde_json::from_str(&raw)
            .with_context(|| format!("parsing roster {}", self.file.display()))?;
        validate(&roster).with_context(|| format!("invalid roster {}", self.file.display()))?;
        debug!(
            people = roster.people.len(),
            exclusions = roster.unavailable.len(),
            "roster loaded"
        );
        Ok(roster)
    }

    fn save(&self, roster: &Roster) -> anyhow::Result<()> {
        validate(roster)?;
        let mut json = serde_json::to_string_pretty(roster)?;
        json.push('\n');

        let mut tmp = NamedTempFile::new_in(self.target_dir()?)
            .context("creating temporary roster file")?;
        tmp.write_all(json.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.file)
            .with_context(|| format!("replacing roster {}", self.file.display()))?;
        debug!(file = %self.file.display(), "roster saved");
        Ok(())
    }
}
