use gone_di::cemetery::Cemetery;
use gone_di::component_registry::GonerOptions;
use gone_di::field::Inject;
use gone_di::instance_provider::ComponentInstancePtr;
use gone_di::{goner_alias, Goner};

// this is a trait we would like to use in our component
trait TestTrait {
    fn foo(&self);
}

// this is a dependency which implements the above trait and also is an injectable component
#[derive(Goner)]
struct TestDependency;

// we're telling the framework to inject TestDependency when asked for dyn TestTrait
#[goner_alias]
impl TestTrait for TestDependency {
    fn foo(&self) {
        println!("Hello world!");
    }
}

// this is another component, but with a dependency
#[derive(Goner, Default)]
struct TestComponent {
    // the framework will fill this field during install
    #[gone]
    dependency: Inject<ComponentInstancePtr<dyn TestTrait + Send + Sync>>,
    // alternatively, you can inject the concrete type
    // #[gone]
    // dependency: Inject<ComponentInstancePtr<TestDependency>>,
}

impl TestComponent {
    fn call_foo(&self) {
        self.dependency.foo();
    }
}

// note: for the sake of simplicity, errors are unwrapped, rather than gracefully handled
fn main() {
    let mut cemetery = Cemetery::new();
    cemetery
        .register(TestDependency, GonerOptions::new())
        .expect("error registering dependency");

    // registration returns a pointer to the component, which will be filled in place
    let component = cemetery
        .register(TestComponent::default(), GonerOptions::new())
        .expect("error registering component");

    cemetery.install().expect("error installing components");

    // prints "Hello world!"
    component.call_foo();
}
