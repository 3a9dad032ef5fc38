// note: this example assumes you've analyzed the previous one

use gone::application;
use gone::runner::ApplicationRunner;
use gone_di::component_registry::GonerOptions;
use gone_di::field::Inject;
use gone_di::instance_provider::ErrorPtr;
use gone_di::{goner_alias, Goner};

// configuration values are provided by the "config" provider, which reads an optional gone.json
// file and GONE_ prefixed environment variables; the key and an optional default are passed in
// "extend"
#[derive(Goner, Default)]
struct GreetingRunner {
    // try running with GONE_GREETING__TARGET=you
    #[gone(name = "config", extend = "greeting.target,default=world")]
    target: Inject<String>,
    #[gone(name = "config", extend = "greeting.repeat,default=1")]
    repeat: Inject<u8>,
    // the framework configuration is available as well
    #[gone(name = "config", extend = "install_tracing_logger,default=true")]
    install_tracing_logger: Inject<bool>,
}

#[goner_alias]
impl ApplicationRunner for GreetingRunner {
    fn run(&self) -> Result<(), ErrorPtr> {
        for _ in 0..*self.repeat {
            println!("Hello {}!", *self.target);
        }

        println!("Using built-in logger: {}", *self.install_tracing_logger);
        Ok(())
    }
}

fn main() {
    let mut application =
        application::create_default().expect("unable to create default application");

    application
        .cemetery_mut()
        .register(GreetingRunner::default(), GonerOptions::new())
        .expect("unable to register runner");

    // prints "Hello world!" and "Using built-in logger: true"
    application.run().expect("error running application");
}
