use gone_di::cemetery::Cemetery;
use gone_di::component::{BeforeFill, Daemon, Initiator};
use gone_di::component_registry::GonerOptions;
use gone_di::field::Inject;
use gone_di::instance_provider::{ComponentInstancePtr, ErrorPtr};
use gone_di::Goner;

#[derive(Goner)]
#[goner(init)]
struct Database;

impl Initiator for Database {
    fn init(&self) -> Result<(), ErrorPtr> {
        println!("database: init");
        Ok(())
    }
}

// components with init hooks are initialized before components which depend on them are filled
#[derive(Goner, Default)]
#[goner(before_fill, init, daemon)]
struct Server {
    #[gone]
    database: Inject<ComponentInstancePtr<Database>>,
}

impl BeforeFill for Server {
    fn before_fill(&self) -> Result<(), ErrorPtr> {
        println!("server: before fill");
        Ok(())
    }
}

impl Initiator for Server {
    fn init(&self) -> Result<(), ErrorPtr> {
        println!("server: init");
        Ok(())
    }
}

impl Daemon for Server {
    fn start(&self) -> Result<(), ErrorPtr> {
        println!("server: start");
        Ok(())
    }

    fn stop(&self) -> Result<(), ErrorPtr> {
        println!("server: stop");
        Ok(())
    }
}

fn main() {
    let mut cemetery = Cemetery::new();
    cemetery
        .register(Server::default(), GonerOptions::new())
        .expect("error registering server");
    cemetery
        .register(Database, GonerOptions::new())
        .expect("error registering database");

    cemetery.install().expect("error installing components");

    // daemons are normally started and stopped by the application
    for (name, daemon) in cemetery.daemons() {
        println!("starting {name}");
        daemon.start().expect("error starting daemon");
        daemon.stop().expect("error stopping daemon");
    }
}
