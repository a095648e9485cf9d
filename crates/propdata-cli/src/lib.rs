//! propdata command line support
//!
//! Reports produced by the `propdata` binary, kept in a library so they can
//! be tested without spawning the binary.

use parking_lot::Mutex;
use propdata_core::builtin::hosts::{ArmorStand, ItemStack, ItemType, LeavesState, Sheep, Vindicator};
use propdata_core::builtin::keys::{DyeColor, TreeType, DYE_COLOR, IS_SHEARED, SHEARED_DATA};
use propdata_core::builtin::kinds;
use propdata_core::{DataManipulator, DataService, ErasedValue, Host};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;

/// Host fixtures the `inspect` command knows about
pub const HOST_NAMES: [&str; 5] = ["sheep", "armor_stand", "vindicator", "item", "leaves"];

/// Every colour, for spreading interning work
const COLORS: [DyeColor; 16] = [
    DyeColor::White,
    DyeColor::Orange,
    DyeColor::Magenta,
    DyeColor::LightBlue,
    DyeColor::Yellow,
    DyeColor::Lime,
    DyeColor::Pink,
    DyeColor::Gray,
    DyeColor::Silver,
    DyeColor::Cyan,
    DyeColor::Purple,
    DyeColor::Blue,
    DyeColor::Brown,
    DyeColor::Green,
    DyeColor::Red,
    DyeColor::Black,
];

/// Registered key
#[derive(Debug, Clone, Serialize)]
pub struct KeyEntry {
    /// Key id
    pub id: String,
    /// Value shape
    pub shape: String,
    /// Value type name
    pub value_type: String,
    /// Default value
    pub default: String,
}

/// Registered bundle kind
#[derive(Debug, Clone, Serialize)]
pub struct KindEntry {
    /// Kind id
    pub id: String,
    /// Ids of its keys
    pub keys: Vec<String>,
}

/// Host kind with the keys resolvable on it
#[derive(Debug, Clone, Serialize)]
pub struct HostEntry {
    /// Kind name
    pub name: String,
    /// Kind and ancestor names, most-derived first
    pub lineage: Vec<String>,
    /// Keys with a processor for this kind
    pub keys: Vec<String>,
}

/// Everything the service knows about
#[derive(Debug, Clone, Serialize)]
pub struct Catalog {
    /// Keys in registration order
    pub keys: Vec<KeyEntry>,
    /// Bundle kinds served by a processor
    pub data_kinds: Vec<KindEntry>,
    /// Built-in host kinds
    pub host_kinds: Vec<HostEntry>,
    /// Number of value processors
    pub value_processors: usize,
    /// Number of data processors
    pub data_processors: usize,
}

/// Build the catalog report
#[must_use]
pub fn catalog(service: &DataService) -> Catalog {
    let keys = service
        .keys()
        .iter()
        .map(|key| KeyEntry {
            id: key.id().to_string(),
            shape: key.shape().to_string(),
            value_type: key.value_type_name().to_string(),
            default: format!("{:?}", key.default_value()),
        })
        .collect();
    let data_kinds = service
        .processors()
        .data_kinds()
        .iter()
        .map(|kind| KindEntry {
            id: kind.id().to_string(),
            keys: kind.keys().iter().map(|k| k.id().to_string()).collect(),
        })
        .collect();
    let host_kinds = kinds::ALL
        .iter()
        .map(|&kind| HostEntry {
            name: kind.name().to_string(),
            lineage: kind.lineage().iter().map(ToString::to_string).collect(),
            keys: service
                .processors()
                .keys_for(kind)
                .iter()
                .map(ToString::to_string)
                .collect(),
        })
        .collect();
    Catalog {
        keys,
        data_kinds,
        host_kinds,
        value_processors: service.processors().value_processor_count(),
        data_processors: service.processors().data_processor_count(),
    }
}

/// Sample host for one of [`HOST_NAMES`]
#[must_use]
pub fn fixture(name: &str) -> Option<Box<dyn Host>> {
    let host: Box<dyn Host> = match name {
        "sheep" => Box::new(Sheep::new(1, DyeColor::Red)),
        "armor_stand" => Box::new(ArmorStand::new(2)),
        "vindicator" => Box::new(Vindicator::new(3)),
        "item" => {
            let mut stack = ItemStack::new(ItemType::damageable("iron_sword", 250));
            stack.damage = 40;
            Box::new(stack)
        }
        "leaves" => Box::new(LeavesState::new(TreeType::Birch)),
        _ => return None,
    };
    Some(host)
}

/// Properties present on one host
#[derive(Debug, Clone, Serialize)]
pub struct Inspection {
    /// Host kind lineage
    pub lineage: Vec<String>,
    /// `key=value` for every supported key with a value
    pub values: Vec<String>,
    /// Bundle kinds currently present
    pub bundles: Vec<String>,
}

/// Read every registered key and bundle from `host`
#[must_use]
pub fn inspect(service: &DataService, host: &dyn Host) -> Inspection {
    let values = service
        .keys()
        .iter()
        .filter_map(|key| service.get_erased(host, key.id()))
        .map(|value| format!("{value:?}"))
        .collect();
    let bundles = service
        .get_manipulators(host)
        .iter()
        .map(|m| m.kind().id().to_string())
        .collect();
    Inspection {
        lineage: host.kind().lineage().iter().map(ToString::to_string).collect(),
        values,
        bundles,
    }
}

/// Outcome of a concurrent interning run
#[derive(Debug, Clone, Serialize)]
pub struct StressReport {
    /// Worker threads
    pub threads: usize,
    /// Interning calls per kind
    pub iterations: usize,
    /// Calls that returned an instance other than the first one seen for
    /// the same value
    pub duplicates: usize,
    /// Entries across all tables
    pub entries: u64,
    /// Cache hits
    pub hits: u64,
    /// Cache misses
    pub misses: u64,
}

impl StressReport {
    /// Whether every value had exactly one canonical instance
    #[inline]
    #[must_use]
    pub fn passed(&self) -> bool {
        self.duplicates == 0
    }
}

/// Intern values and bundles from `threads` workers at once and check that
/// every equal construction yielded the same instance
///
/// # Errors
/// If the worker pool cannot be started.
pub fn intern_stress(
    service: &DataService,
    threads: usize,
    iterations: usize,
) -> Result<StressReport, rayon::ThreadPoolBuildError> {
    let pool = rayon::ThreadPoolBuilder::new().num_threads(threads).build()?;
    let values: Mutex<HashMap<DyeColor, ErasedValue>> = Mutex::new(HashMap::new());
    let bundles = Mutex::new(HashMap::new());

    let duplicates = pool.install(|| {
        (0..iterations)
            .into_par_iter()
            .map(|i| {
                let color = COLORS[i % COLORS.len()];
                let value = service.intern_value(&DYE_COLOR, color);
                let mut dupes = usize::from(
                    !values.lock().entry(color).or_insert_with(|| value.clone()).ptr_eq(&value),
                );

                let sheared = i % 2 == 0;
                let mut bundle = DataManipulator::new((*SHEARED_DATA).clone());
                if bundle.set(&IS_SHEARED, sheared).is_successful() {
                    let frozen = service.intern_manipulator(bundle.as_immutable());
                    let canonical = bundles
                        .lock()
                        .entry(sheared)
                        .or_insert_with(|| frozen.clone())
                        .ptr_eq(&frozen);
                    dupes += usize::from(!canonical);
                }
                dupes
            })
            .sum::<usize>()
    });

    let stats = service.cache().stats();
    let report = StressReport {
        threads,
        iterations,
        duplicates,
        entries: stats.entry_count,
        hits: stats.hits,
        misses: stats.misses,
    };
    if report.passed() {
        tracing::info!(?report, "interning stress passed");
    } else {
        tracing::error!(?report, "interning published duplicate instances");
    }
    Ok(report)
}
