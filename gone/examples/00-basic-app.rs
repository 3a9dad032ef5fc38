use gone::application;
use gone::runner::ApplicationRunner;
use gone_di::component_registry::GonerOptions;
use gone_di::instance_provider::ErrorPtr;
use gone_di::{goner_alias, Goner};

// this is an application runner, which will run when the application starts; the framework will
// find it by its ApplicationRunner alias
#[derive(Goner)]
struct HelloWorldRunner;

#[goner_alias]
impl ApplicationRunner for HelloWorldRunner {
    fn run(&self) -> Result<(), ErrorPtr> {
        println!("Hello world!");
        Ok(())
    }
}

// note: for the sake of simplicity, errors are unwrapped, rather than gracefully handled
fn main() {
    // create our application with configuration and default components in place
    let mut application =
        application::create_default().expect("unable to create default application");

    application
        .cemetery_mut()
        .register(HelloWorldRunner, GonerOptions::new())
        .expect("unable to register runner");

    // prints "Hello world!"
    application.run().expect("error running application");
}
