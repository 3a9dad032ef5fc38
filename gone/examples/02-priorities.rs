// note: this example assumes you've analyzed the previous one

use gone::application;
use gone::runner::ApplicationRunner;
use gone_di::component::Daemon;
use gone_di::component_registry::GonerOptions;
use gone_di::instance_provider::ErrorPtr;
use gone_di::{goner_alias, Goner};

#[derive(Goner)]
struct PrintHelloRunner;

#[goner_alias]
impl ApplicationRunner for PrintHelloRunner {
    fn run(&self) -> Result<(), ErrorPtr> {
        print!("Hello ");
        Ok(())
    }

    // for ordered execution of application runners, priorities can be used
    fn priority(&self) -> i8 {
        3
    }
}

#[derive(Goner)]
struct PrintWorldRunner;

#[goner_alias]
impl ApplicationRunner for PrintWorldRunner {
    fn run(&self) -> Result<(), ErrorPtr> {
        println!("world!");
        Ok(())
    }

    fn priority(&self) -> i8 {
        2
    }
}

// daemons are started before runners and stopped after them, in reverse order
#[derive(Goner)]
#[goner(daemon)]
struct Server(&'static str);

impl Daemon for Server {
    fn start(&self) -> Result<(), ErrorPtr> {
        println!("{} started", self.0);
        Ok(())
    }

    fn stop(&self) -> Result<(), ErrorPtr> {
        println!("{} stopped", self.0);
        Ok(())
    }
}

fn main() {
    let mut application =
        application::create_default().expect("unable to create default application");

    let cemetery = application.cemetery_mut();

    // registration order doesn't matter for runners
    cemetery
        .register(PrintWorldRunner, GonerOptions::new())
        .expect("unable to register runner");
    cemetery
        .register(PrintHelloRunner, GonerOptions::new())
        .expect("unable to register runner");

    // for daemons, start priority does
    cemetery
        .register(Server("backend"), GonerOptions::new().high_start_priority())
        .expect("unable to register daemon");
    cemetery
        .register(Server("frontend"), GonerOptions::new().low_start_priority())
        .expect("unable to register daemon");

    // prints "backend started", "frontend started", "Hello world!", "frontend stopped" and
    // "backend stopped"
    application.run().expect("error running application");
}
