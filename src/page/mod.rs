//! # Page Module
//!
//! The entry points the world system calls: load a page from a template path,
//! and carve a door into a loaded page.
//!
//! Loading never crashes the game. A template that is missing, unparsable or
//! malformed is replaced by the default empty page and the failure is logged.

use crate::config::DEFAULT_PAGE_SIZE;
use crate::resolve::{vocabulary, DoorDirection, PageResolver, PassabilityGrid, RuleTable};
use crate::symmetry::SymmetryGrid;
use crate::template::{DocumentSource, DocumentState, RawTemplate, XmlDocumentSource};
use crate::{LoadError, PageResult};
use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for page loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    /// Random seed; `None` seeds from system entropy
    pub seed: Option<u64>,
    /// Side length of the fallback page
    pub fallback_size: usize,
    /// Identifier used for the fallback page's border
    pub fallback_wall: u32,
    /// Identifier used for the fallback page's interior
    pub fallback_background: u32,
    /// Identifier vocabulary for resolution and door carving
    pub rules: RuleTable,
}

impl PageConfig {
    /// Creates a configuration with the built-in vocabulary.
    ///
    /// # Examples
    ///
    /// ```
    /// use pagegen::PageConfig;
    ///
    /// let config = PageConfig::new(Some(7));
    /// assert_eq!(config.seed, Some(7));
    /// assert_eq!(config.fallback_size, 16);
    /// ```
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            seed,
            fallback_size: DEFAULT_PAGE_SIZE,
            fallback_wall: vocabulary::WALL,
            fallback_background: vocabulary::BACKGROUND,
            rules: RuleTable::default_vocabulary(),
        }
    }

    /// Creates a seeded configuration with a small fallback page.
    pub fn for_testing(seed: u64) -> Self {
        Self {
            fallback_size: 4,
            ..Self::new(Some(seed))
        }
    }

    /// Parses a configuration from JSON; missing fields take defaults.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Config`] if the JSON does not match.
    pub fn from_json_str(json: &str) -> PageResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Io`] if the file cannot be read and
    /// [`LoadError::Config`] if it does not parse.
    pub fn from_json_file(path: &Path) -> PageResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    fn create_rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

impl Default for PageConfig {
    fn default() -> Self {
        Self::new(None)
    }
}

/// Loads templates and turns them into passability grids.
///
/// Owns the random source used for symmetry selection and coin draws, so
/// consecutive loads of the same template produce different pages.
#[derive(Debug)]
pub struct PageLoader<S: DocumentSource = XmlDocumentSource> {
    source: S,
    resolver: PageResolver,
    config: PageConfig,
    rng: StdRng,
}

impl PageLoader<XmlDocumentSource> {
    /// Creates a loader reading template files from disk.
    pub fn from_files(config: PageConfig) -> Self {
        Self::new(XmlDocumentSource::new(), config)
    }
}

impl<S: DocumentSource> PageLoader<S> {
    /// Creates a loader over any document source.
    pub fn new(source: S, config: PageConfig) -> Self {
        let rng = config.create_rng();
        Self {
            source,
            resolver: PageResolver::new(config.rules.clone()),
            config,
            rng,
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    /// Loads a page, substituting the default empty page on failure.
    pub fn load_page(&mut self, path: impl AsRef<Path>) -> PassabilityGrid {
        let path = path.as_ref();
        match self.try_load_page(path) {
            Ok(page) => page,
            Err(err) => {
                warn!("Using fallback page for '{}': {}", path.display(), err);
                self.fallback_page()
            }
        }
    }

    /// Loads a page, reporting failures to the caller.
    ///
    /// # Errors
    ///
    /// [`LoadError::MissingDocument`] if the source has no ready document for
    /// `path`, [`LoadError::MalformedTemplate`] if the template fails validation.
    pub fn try_load_page(&mut self, path: impl AsRef<Path>) -> PageResult<PassabilityGrid> {
        let grid = self.load_grid(path)?;
        Ok(self.resolve(&grid))
    }

    /// Resolves a loaded grid with this loader's rules and random source.
    pub fn resolve(&mut self, grid: &SymmetryGrid) -> PassabilityGrid {
        self.resolver.resolve(grid, &mut self.rng)
    }

    /// Loads and re-orients a template without resolving it.
    ///
    /// # Errors
    ///
    /// Same as [`try_load_page`](Self::try_load_page).
    pub fn load_grid(&mut self, path: impl AsRef<Path>) -> PageResult<SymmetryGrid> {
        let path = path.as_ref();
        let root = match self.source.fetch(path) {
            DocumentState::Ready(root) => root,
            DocumentState::Unready => {
                return Err(LoadError::MissingDocument {
                    path: path.to_path_buf(),
                    reason: "document not ready".to_string(),
                })
            }
            DocumentState::Failed(reason) => {
                return Err(LoadError::MissingDocument {
                    path: path.to_path_buf(),
                    reason,
                })
            }
        };

        let template = RawTemplate::from_document(&root);
        let grid = SymmetryGrid::load(&template, &mut self.rng)?;
        info!(
            "Loaded page '{}' ({}x{}, {})",
            path.display(),
            grid.size(),
            grid.size(),
            grid.chosen_op()
        );
        Ok(grid)
    }

    /// Resolves an in-memory template.
    ///
    /// # Errors
    ///
    /// [`LoadError::MalformedTemplate`] if the template fails validation.
    pub fn load_template(&mut self, template: &RawTemplate) -> PageResult<PassabilityGrid> {
        let grid = SymmetryGrid::load(template, &mut self.rng)?;
        Ok(self.resolve(&grid))
    }

    /// The default empty page: solid border, open interior.
    ///
    /// The shape does not depend on the rule table.
    pub fn fallback_page(&self) -> PassabilityGrid {
        PassabilityGrid::fallback(
            self.config.fallback_size,
            self.config.fallback_wall,
            self.config.fallback_background,
            self.config.rules.exit_marker(),
        )
    }
}

/// Opens the exit markers in one edge band of a page.
///
/// # Examples
///
/// ```
/// use pagegen::{carve_door, DoorDirection, PageConfig, PageLoader, RawTemplate};
///
/// let mut loader = PageLoader::from_files(PageConfig::for_testing(1));
/// let template = RawTemplate::square(4, vec![2; 16]);
/// let mut page = loader.load_template(&template).unwrap();
/// assert_eq!(page.solid_count(), 16);
///
/// carve_door(&mut page, DoorDirection::Down);
/// assert_eq!(page.solid_count(), 12);
/// ```
pub fn carve_door(grid: &mut PassabilityGrid, direction: DoorDirection) {
    grid.carve_door(direction);
}
