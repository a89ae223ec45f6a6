use std::collections::HashSet;

use async_trait::async_trait;
use tracing::{instrument, warn};

use crate::sources::{RawRecord, Source, SourceError};

/// Several listings read as one batch.
///
/// Records keep the order of the sources; an identity seen in an earlier
/// source shadows later ones. A failing source contributes nothing. The
/// merge only fails when every source failed.
pub struct MergedSource {
    name: String,
    sources: Vec<Box<dyn Source>>,
}

impl MergedSource {
    pub fn new(name: impl Into<String>, sources: Vec<Box<dyn Source>>) -> Self {
        Self {
            name: name.into(),
            sources,
        }
    }
}

#[async_trait]
impl Source for MergedSource {
    fn name(&self) -> String {
        self.name.clone()
    }

    #[instrument(skip(self), fields(source = %self.name, parts = self.sources.len()))]
    async fn fetch(&self) -> Result<Vec<RawRecord>, SourceError> {
        let mut seen = HashSet::new();
        let mut records = Vec::new();
        let mut last_error = None;
        let mut succeeded = 0usize;

        for source in &self.sources {
            match source.fetch().await {
                Ok(batch) => {
                    succeeded += 1;
                    records.extend(
                        batch
                            .into_iter()
                            .filter(|r| seen.insert(r.identity.clone())),
                    );
                }
                Err(e) => {
                    warn!(part = %source.name(), error = %e, "listing unavailable");
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if succeeded == 0 => Err(e),
            _ => Ok(records),
        }
    }
}
