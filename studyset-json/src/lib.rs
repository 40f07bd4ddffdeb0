use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use studyset_core::{
    repo::Repository, CoreError, SavePlan, StudySet, StudySetId, Term, TermId, TermUpsert, UserId,
};
use tempfile::NamedTempFile;
use tokio::task;

pub mod paths;

const FILE_VERSION: u32 = 1;

#[derive(Clone, Serialize, Deserialize)]
struct FileImage {
    version: u32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    study_sets: Vec<StudySet>,
    terms: Vec<Term>,
}

#[derive(Default, Clone)]
struct State {
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    sets: HashMap<StudySetId, StudySet>,
    terms: HashMap<TermId, Term>,
}

impl State {
    fn new_empty() -> Self {
        let now = Utc::now();
        Self {
            created_at: now,
            updated_at: now,
            sets: HashMap::new(),
            terms: HashMap::new(),
        }
    }

    fn to_image(&self) -> FileImage {
        FileImage {
            version: FILE_VERSION,
            created_at: self.created_at,
            updated_at: self.updated_at,
            study_sets: self.sets.values().cloned().collect(),
            terms: self.terms.values().cloned().collect(),
        }
    }

    fn from_image(img: FileImage) -> Self {
        let mut sets = HashMap::new();
        for s in img.study_sets {
            sets.insert(s.id, s);
        }
        let mut terms = HashMap::new();
        for t in img.terms {
            terms.insert(t.id, t);
        }
        Self {
            created_at: img.created_at,
            updated_at: img.updated_at,
            sets,
            terms,
        }
    }
}

pub struct JsonStore {
    path: PathBuf,
    backups_dir: PathBuf,
    max_backups: usize,
    state: RwLock<State>,
}

impl JsonStore {
    pub async fn open_default() -> Result<Self, CoreError> {
        let (file, backups) = paths::default_store_file();
        Self::open_with(file, backups, 10).await
    }

    pub async fn open_with(path: PathBuf, backups_dir: PathBuf, max_backups: usize) -> Result<Self, CoreError> {
        ensure_parent_dirs(&path)?;
        ensure_dir(&backups_dir)?;
        let state = load_or_init(&path).await?;
        Ok(Self {
            path,
            backups_dir,
            max_backups: max_backups.max(1),
            state: RwLock::new(state),
        })
    }

    async fn save(&self) -> Result<(), CoreError> {
        let snapshot = {
            let mut s = self.state.write();
            s.updated_at = Utc::now();
            s.to_image()
        };
        let path = self.path.clone();
        let backups = self.backups_dir.clone();
        let keep = self.max_backups;

        // Join error -> CoreError, inner io::Error -> CoreError
        task::spawn_blocking(move || write_with_backup(&path, &backups, keep, &snapshot))
            .await
            .map_err(|_| CoreError::Storage("io"))?
            .map_err(|_| CoreError::Storage("io"))?;
        Ok(())
    }
}

fn ensure_parent_dirs(path: &Path) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    Ok(())
}

fn ensure_dir(path: &Path) -> Result<(), CoreError> {
    fs::create_dir_all(path).map_err(|_| CoreError::Storage("io"))
}

async fn load_or_init(path: &Path) -> Result<State, CoreError> {
    if path.exists() {
        let p = path.to_path_buf();
        let img: FileImage = task::spawn_blocking(move || {
            let mut f = fs::File::open(&p)?;
            let mut buf = String::new();
            f.read_to_string(&mut buf)?;
            let v = serde_json::from_str::<FileImage>(&buf)?;
            Ok::<FileImage, std::io::Error>(v)
        })
        .await
        .map_err(|_| CoreError::Storage("io"))
        .and_then(|r| r.map_err(|_| CoreError::Storage("io")))?;
        let mut st = State::from_image(img);
        st.updated_at = Utc::now();
        Ok(st)
    } else {
        let st = State::new_empty();
        let img = st.to_image();
        write_with_backup(path, &path.with_extension("backups"), 1, &img).map_err(|_| CoreError::Storage("io"))?;
        Ok(st)
    }
}

fn write_with_backup(path: &Path, backups_dir: &Path, max_backups: usize, img: &FileImage) -> Result<(), std::io::Error> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::create_dir_all(backups_dir)?;

    let json = serde_json::to_vec_pretty(img).expect("serialize");
    let mut tmp = NamedTempFile::new_in(path.parent().unwrap_or_else(|| Path::new(".")))?;
    tmp.write_all(&json)?;
    tmp.flush()?;
    let _ = fs::remove_file(path);
    tmp.persist(path)?;

    // Backup rotation
    let ts = chrono::Local::now().format("%Y%m%d-%H%M%S");
    let backup_name = format!("studyset-{ts}.json");
    let backup_path = backups_dir.join(backup_name);
    let mut btmp = NamedTempFile::new_in(backups_dir)?;
    btmp.write_all(&json)?;
    btmp.flush()?;
    let _ = fs::remove_file(&backup_path);
    btmp.persist(&backup_path)?;

    rotate_backups(backups_dir, max_backups)?;

    Ok(())
}

fn rotate_backups(dir: &Path, keep: usize) -> Result<(), std::io::Error> {
    let mut entries: Vec<_> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("json"))
        .collect();
    entries.sort_by_key(|e| e.metadata().and_then(|m| m.modified()).ok());
    if entries.len() > keep {
        for e in &entries[0..entries.len() - keep] {
            let _ = fs::remove_file(e.path());
        }
    }
    Ok(())
}

use async_trait::async_trait;

#[async_trait]
impl Repository for JsonStore {
    async fn insert_study_set(&self, set: &StudySet) -> Result<(), CoreError> {
        {
            let mut s = self.state.write();
            if s.sets.contains_key(&set.id) {
                return Err(CoreError::Conflict("study set id already exists"));
            }
            s.sets.insert(set.id, set.clone());
        }
        self.save().await
    }

    async fn get_study_set(&self, id: StudySetId) -> Result<StudySet, CoreError> {
        let s = self.state.read();
        s.sets.get(&id).cloned().ok_or(CoreError::NotFound("study set"))
    }

    async fn list_study_sets(&self, user_id: Option<UserId>) -> Result<Vec<StudySet>, CoreError> {
        let s = self.state.read();
        let mut v: Vec<StudySet> = s.sets.values().cloned().collect();
        if let Some(uid) = user_id {
            v.retain(|set| set.user_id == uid);
        }
        v.sort_by_key(|set| set.created_at);
        Ok(v)
    }

    async fn update_study_set(&self, set: &StudySet) -> Result<StudySet, CoreError> {
        {
            let mut s = self.state.write();
            if !s.sets.contains_key(&set.id) {
                return Err(CoreError::NotFound("study set"));
            }
            s.sets.insert(set.id, set.clone());
        }
        self.save().await?;
        Ok(set.clone())
    }

    async fn delete_study_set(&self, id: StudySetId) -> Result<(), CoreError> {
        {
            let mut s = self.state.write();
            if s.sets.remove(&id).is_none() {
                return Err(CoreError::NotFound("study set"));
            }
            s.terms.retain(|_, t| t.study_set_id != id);
        }
        self.save().await
    }

    async fn list_terms(&self, study_set_id: Option<StudySetId>) -> Result<Vec<Term>, CoreError> {
        let s = self.state.read();
        let mut v: Vec<Term> = s.terms.values().cloned().collect();
        if let Some(sid) = study_set_id {
            v.retain(|t| t.study_set_id == sid);
        }
        v.sort_by_key(|t| (t.study_set_id, t.rank));
        Ok(v)
    }

    async fn insert_term(&self, term: &Term) -> Result<(), CoreError> {
        {
            let mut s = self.state.write();
            if !s.sets.contains_key(&term.study_set_id) {
                return Err(CoreError::NotFound("study set"));
            }
            s.terms.insert(term.id, term.clone());
        }
        self.save().await
    }

    async fn update_term(
        &self,
        id: TermId,
        word: &str,
        definition: &str,
        rank: i32,
    ) -> Result<(), CoreError> {
        {
            let mut s = self.state.write();
            let Some(t) = s.terms.get_mut(&id) else {
                return Err(CoreError::NotFound("term"));
            };
            t.word = word.to_string();
            t.definition = definition.to_string();
            t.rank = rank;
        }
        self.save().await
    }

    async fn delete_terms(&self, ids: &[TermId]) -> Result<(), CoreError> {
        {
            let mut s = self.state.write();
            for id in ids {
                s.terms.remove(id);
            }
        }
        self.save().await
    }

    // One lock, one flush: the whole plan lands in a single file image.
    async fn apply_save(&self, plan: &SavePlan) -> Result<(), CoreError> {
        {
            let mut s = self.state.write();
            if !s.sets.contains_key(&plan.study_set_id) {
                return Err(CoreError::NotFound("study set"));
            }
            for upsert in &plan.upserts {
                if let TermUpsert::Update { id, .. } = upsert {
                    if !s.terms.contains_key(id) {
                        return Err(CoreError::NotFound("term"));
                    }
                }
            }
            for id in &plan.deletes {
                s.terms.remove(id);
            }
            for upsert in &plan.upserts {
                match upsert {
                    TermUpsert::Insert(term) => {
                        s.terms.insert(term.id, term.clone());
                    }
                    TermUpsert::Update {
                        id,
                        word,
                        definition,
                        rank,
                    } => {
                        if let Some(t) = s.terms.get_mut(id) {
                            t.word = word.clone();
                            t.definition = definition.clone();
                            t.rank = *rank;
                        }
                    }
                }
            }
        }
        self.save().await
    }
}
