//! One update cycle: remember the selection, load, filter, render, commit.

use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use anyhow::{anyhow, Result};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    catalog::{CatalogLoader, CreatureRecord},
    criteria::Selection,
    error::{CatalogError, UpdateError},
    pipeline::{filter_and_group, GroupedTables},
    prefs::{self, PreferenceStore},
    render::{render_tables, Layout},
    session::{UpdateSession, UpdateToken},
};

pub enum CatalogSource {
    /// Parsed once and reused for every update.
    Cached(Arc<Vec<CreatureRecord>>),
    /// Read from disk on every update.
    Reload(PathBuf),
}

impl CatalogSource {
    pub fn open(path: PathBuf, reload: bool) -> Result<Self, CatalogError> {
        if reload {
            Ok(CatalogSource::Reload(path))
        } else {
            let records = CatalogLoader::new(".").load(&path)?;
            Ok(CatalogSource::Cached(Arc::new(records)))
        }
    }

    pub fn records(&self) -> Result<Arc<Vec<CreatureRecord>>, CatalogError> {
        match self {
            CatalogSource::Cached(records) => Ok(Arc::clone(records)),
            CatalogSource::Reload(path) => Ok(Arc::new(CatalogLoader::new(".").load(path)?)),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateResult {
    pub token: u64,
    pub selection: Selection,
    pub html: String,
    pub tables: GroupedTables,
}

#[derive(Debug)]
pub enum UpdateOutcome {
    Committed(UpdateResult),
    /// A newer update committed first; this result was not displayed.
    Stale(UpdateResult),
}

pub struct TableService {
    catalog: CatalogSource,
    layout: Layout,
    preferences: Mutex<Box<dyn PreferenceStore>>,
    session: UpdateSession<UpdateResult>,
}

impl TableService {
    pub fn new(
        catalog: CatalogSource,
        layout: Layout,
        preferences: Box<dyn PreferenceStore>,
    ) -> Self {
        Self {
            catalog,
            layout,
            preferences: Mutex::new(preferences),
            session: UpdateSession::new(),
        }
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn selection(&self) -> Result<Selection> {
        let store = self
            .preferences
            .lock()
            .map_err(|_| anyhow!("preference store lock poisoned"))?;
        Ok(prefs::load_selection(&**store))
    }

    pub fn begin(&self) -> UpdateToken {
        self.session.begin()
    }

    /// Runs the pipeline for `selection` under `token` and tries to commit.
    /// A catalog failure leaves the last committed result in place.
    pub fn run(
        &self,
        token: UpdateToken,
        selection: Selection,
    ) -> Result<UpdateOutcome, CatalogError> {
        let records = self.catalog.records()?;
        let criteria = selection.criteria();
        let tables = filter_and_group(&records, &criteria);
        debug!(
            token = token.raw(),
            tool_power = criteria.tool_power,
            season = %criteria.season,
            weather = %criteria.weather,
            entries = tables.entry_count(),
            "tables built"
        );
        let result = UpdateResult {
            token: token.raw(),
            selection,
            html: render_tables(&tables, self.layout),
            tables,
        };
        if self.session.commit(token, result.clone()) {
            info!(token = token.raw(), "update committed");
            Ok(UpdateOutcome::Committed(result))
        } else {
            warn!(token = token.raw(), "dropping stale update");
            Ok(UpdateOutcome::Stale(result))
        }
    }

    /// Saves the selection and takes a token, then runs the update.
    ///
    /// Saving and token issue happen under the preference lock, so the last
    /// selection saved is always the one holding the newest token.
    pub fn update(&self, selection: Selection) -> Result<UpdateOutcome, UpdateError> {
        let token = {
            let mut store = self.preferences.lock().map_err(|_| UpdateError::Poisoned)?;
            prefs::save_selection(&mut **store, &selection)?;
            self.begin()
        };
        Ok(self.run(token, selection)?)
    }

    pub fn latest(&self) -> Option<UpdateResult> {
        self.session.latest()
    }
}
