use gone_di::cemetery::Cemetery;
use gone_di::component_registry::GonerOptions;
use gone_di::field::{Inject, InjectMap, InjectVec};
use gone_di::instance_provider::ComponentInstancePtr;
use gone_di::{goner_alias, Goner};

trait Storage {
    fn name(&self) -> &'static str;
}

#[derive(Goner)]
struct FileStorage;

// when multiple components implement a trait, the default one is injected into single fields
#[goner_alias(default)]
impl Storage for FileStorage {
    fn name(&self) -> &'static str {
        "file"
    }
}

#[derive(Goner)]
struct MemoryStorage;

#[goner_alias]
impl Storage for MemoryStorage {
    fn name(&self) -> &'static str {
        "memory"
    }
}

#[derive(Goner, Default)]
struct Backup {
    // the default storage
    #[gone]
    primary: Inject<ComponentInstancePtr<dyn Storage + Send + Sync>>,
    // storage with an explicit name
    #[gone(name = "storage-memory")]
    cache: Inject<ComponentInstancePtr<dyn Storage + Send + Sync>>,
    // all storages, in registration order
    #[gone]
    all: InjectVec<ComponentInstancePtr<dyn Storage + Send + Sync>>,
    // storages with names matching a wildcard pattern, keyed by name
    #[gone(name = "storage-*")]
    named: InjectMap<ComponentInstancePtr<dyn Storage + Send + Sync>>,
    // a missing optional dependency is simply left empty
    #[gone(name = "storage-remote", allow_nil)]
    remote: Inject<ComponentInstancePtr<dyn Storage + Send + Sync>>,
}

fn main() {
    let mut cemetery = Cemetery::new();
    cemetery
        .register(FileStorage, GonerOptions::new().name("storage-file"))
        .expect("error registering file storage");
    cemetery
        .register(MemoryStorage, GonerOptions::new().name("storage-memory"))
        .expect("error registering memory storage");

    let backup = cemetery
        .register(Backup::default(), GonerOptions::new())
        .expect("error registering backup");

    cemetery.install().expect("error installing components");

    println!("primary: {}", backup.primary.name());
    println!("cache: {}", backup.cache.name());
    println!("all: {:?}", backup.all.iter().map(|s| s.name()).collect::<Vec<_>>());
    println!("named: {:?}", backup.named.keys().collect::<Vec<_>>());
    println!("remote present: {}", backup.remote.get().is_some());
}
