use crate::error::{Error, Result};
use ordered_float::NotNan;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Ordering key for vertical migration. Totally ordered, never NaN.
pub type Density = NotNan<f64>;

/// Density assumed for a kind that is not in the registry.
///
/// Equal to the density of the empty kind, so an unrecognised kind behaves as empty.
/// Only applied where [`UnknownKindPolicy::TreatAsEmpty`] is in effect, or inside the
/// step engine, which is total.
pub const UNKNOWN_KIND_DENSITY: f64 = 0.0;

/// Stable small-integer identifier of a gas kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KindId(pub u8);

impl fmt::Display for KindId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What to do when a kind name or id is not registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownKindPolicy {
    /// Surface [`Error::UnknownKind`].
    Reject,
    /// Fall back to the empty kind (density [`UNKNOWN_KIND_DENSITY`]) and log a warning.
    #[default]
    TreatAsEmpty,
}

/// An immutable gas kind: stable id, unique name, density and display color.
#[derive(Debug, Clone, PartialEq)]
pub struct GasKind {
    /// Stable identifier.
    pub id: KindId,
    /// Unique display name (also the key used in snapshots).
    pub name: String,
    /// Non-negative ordering key; denser kinds sink.
    pub density: Density,
    /// Opaque display value, e.g. `"#ff00ff"`.
    pub color: String,
}

impl GasKind {
    /// Create a gas kind after validating its density.
    ///
    /// Errors:
    /// - `Error::InvalidParam` if `density` is NaN, infinite or negative, or `name` is blank.
    pub fn new(
        id: u8,
        name: impl Into<String>,
        density: f64,
        color: impl Into<String>,
    ) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::InvalidParam("gas kind name must not be empty".into()));
        }
        if !density.is_finite() || density < 0.0 {
            return Err(Error::InvalidParam(format!(
                "density of '{name}' must be finite and >= 0"
            )));
        }
        let density = NotNan::new(density)
            .map_err(|_| Error::InvalidParam(format!("density of '{name}' cannot be NaN")))?;
        Ok(Self {
            id: KindId(id),
            name,
            density,
            color: color.into(),
        })
    }

    /// Returns the raw f64 density.
    #[inline]
    pub fn density_f64(&self) -> f64 {
        self.density.into_inner()
    }

    /// True for the kind that represents empty space (density 0).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.density.into_inner() == 0.0
    }
}

/// Fixed table of gas kinds, built once and shared by reference.
///
/// Always holds exactly one kind of density 0 (the "empty" kind). Id lookup goes
/// through a dense slot table, name lookup through a hash map; both are O(1).
#[derive(Debug, Clone)]
pub struct GasRegistry {
    kinds: Vec<GasKind>,
    by_id: Vec<Option<usize>>,
    by_name: HashMap<String, usize>,
    empty: usize,
}

impl GasRegistry {
    /// Build a registry from a list of kinds.
    ///
    /// Errors:
    /// - `Error::InvalidParam` if the list is empty, ids or names repeat, or there is not
    ///   exactly one kind of density 0.
    pub fn new(kinds: Vec<GasKind>) -> Result<Self> {
        if kinds.is_empty() {
            return Err(Error::InvalidParam("registry needs at least one kind".into()));
        }

        let mut by_id: Vec<Option<usize>> = Vec::new();
        let mut by_name = HashMap::with_capacity(kinds.len());
        let mut empty: Option<usize> = None;

        for (idx, kind) in kinds.iter().enumerate() {
            let slot = kind.id.0 as usize;
            if by_id.len() <= slot {
                by_id.resize(slot + 1, None);
            }
            if by_id[slot].replace(idx).is_some() {
                return Err(Error::InvalidParam(format!(
                    "duplicate gas kind id {}",
                    kind.id
                )));
            }
            if by_name.insert(kind.name.clone(), idx).is_some() {
                return Err(Error::InvalidParam(format!(
                    "duplicate gas kind name '{}'",
                    kind.name
                )));
            }
            if kind.is_empty() && empty.replace(idx).is_some() {
                return Err(Error::InvalidParam(
                    "registry must contain exactly one kind of density 0".into(),
                ));
            }
        }

        let empty = empty.ok_or_else(|| {
            Error::InvalidParam("registry must contain exactly one kind of density 0".into())
        })?;

        Ok(Self {
            kinds,
            by_id,
            by_name,
            empty,
        })
    }

    /// Number of registered kinds (including empty).
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Always false: a valid registry holds at least the empty kind.
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// All kinds in registration order.
    pub fn kinds(&self) -> &[GasKind] {
        &self.kinds
    }

    /// The unique density-0 kind.
    pub fn empty(&self) -> &GasKind {
        &self.kinds[self.empty]
    }

    /// Whether `id` is registered.
    pub fn contains(&self, id: KindId) -> bool {
        self.slot(id).is_some()
    }

    #[inline]
    fn slot(&self, id: KindId) -> Option<usize> {
        self.by_id.get(id.0 as usize).copied().flatten()
    }

    /// Look up a kind by id.
    pub fn lookup(&self, id: KindId) -> Result<&GasKind> {
        self.slot(id)
            .map(|idx| &self.kinds[idx])
            .ok_or_else(|| Error::UnknownKind(id.to_string()))
    }

    /// Look up a kind by name.
    pub fn lookup_name(&self, name: &str) -> Result<&GasKind> {
        self.by_name
            .get(name)
            .map(|&idx| &self.kinds[idx])
            .ok_or_else(|| Error::UnknownKind(format!("'{name}'")))
    }

    /// Density of a kind by name; fails for unregistered names.
    pub fn density_of(&self, name: &str) -> Result<Density> {
        self.lookup_name(name).map(|k| k.density)
    }

    /// Density of a kind by id; fails for unregistered ids.
    pub fn density_of_id(&self, id: KindId) -> Result<Density> {
        self.lookup(id).map(|k| k.density)
    }

    /// Density of a kind by name under an explicit unknown-kind policy.
    pub fn resolve_density(&self, name: &str, policy: UnknownKindPolicy) -> Result<Density> {
        self.resolve_name(name, policy).map(|k| k.density)
    }

    /// Resolve a kind by name under an explicit unknown-kind policy.
    ///
    /// With [`UnknownKindPolicy::TreatAsEmpty`] an unknown name maps to the empty kind.
    pub fn resolve_name(&self, name: &str, policy: UnknownKindPolicy) -> Result<&GasKind> {
        match (self.lookup_name(name), policy) {
            (Ok(kind), _) => Ok(kind),
            (Err(e), UnknownKindPolicy::Reject) => Err(e),
            (Err(_), UnknownKindPolicy::TreatAsEmpty) => {
                log::warn!("unknown gas kind '{name}', treating as '{}'", self.empty().name);
                Ok(self.empty())
            }
        }
    }

    /// Pick a kind uniformly at random over all registered kinds, empty included.
    pub fn random_kind<R: Rng + ?Sized>(&self, rng: &mut R) -> &GasKind {
        let idx = rng.random_range(0..self.kinds.len());
        &self.kinds[idx]
    }
}

impl Default for GasRegistry {
    /// The six-kind table: `Empty` (density 0) and `Gas 1`..`Gas 5` with density equal
    /// to their number.
    fn default() -> Self {
        const TABLE: [(u8, &str, f64, &str); 6] = [
            (0, "Empty", 0.0, "#ffffff"),
            (1, "Gas 1", 1.0, "#0000ff"),
            (2, "Gas 2", 2.0, "#00ff00"),
            (3, "Gas 3", 3.0, "#ff0000"),
            (4, "Gas 4", 4.0, "#00ffff"),
            (5, "Gas 5", 5.0, "#ff00ff"),
        ];
        let by_id = (0..TABLE.len()).map(Some).collect();
        let by_name = TABLE
            .iter()
            .enumerate()
            .map(|(idx, (_, name, _, _))| ((*name).to_string(), idx))
            .collect();
        let kinds = TABLE
            .iter()
            .map(|&(id, name, density, color)| GasKind {
                id: KindId(id),
                name: name.to_string(),
                density: NotNan::new(density).unwrap_or_default(),
                color: color.to_string(),
            })
            .collect();
        Self {
            kinds,
            by_id,
            by_name,
            empty: 0,
        }
    }
}
