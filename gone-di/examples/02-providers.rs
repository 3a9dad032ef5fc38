use gone_di::cemetery::Cemetery;
use gone_di::component_registry::GonerOptions;
use gone_di::field::Inject;
use gone_di::instance_provider::{ComponentInstancePtr, ErrorPtr};
use gone_di::provider::{NoneParamProvider, Provider};
use gone_di::Goner;

// a plain type, which is not a component itself
struct Connection {
    url: String,
}

// providers synthesize values on demand, instead of being injected by reference
#[derive(Goner)]
#[goner(provider = "ComponentInstancePtr<Connection>", none_param_provider = "u16")]
struct ConnectionFactory;

impl Provider<ComponentInstancePtr<Connection>> for ConnectionFactory {
    // the configuration comes from the `extend` part of the field annotation
    fn provide(&self, conf: &str) -> Result<ComponentInstancePtr<Connection>, ErrorPtr> {
        Ok(ComponentInstancePtr::new(Connection {
            url: format!("db://{conf}"),
        }))
    }
}

impl NoneParamProvider<u16> for ConnectionFactory {
    fn provide(&self) -> Result<u16, ErrorPtr> {
        Ok(5432)
    }
}

#[derive(Goner, Default)]
struct Repository {
    // no Connection component exists, so the typed provider is used
    #[gone(extend = "users")]
    users: Inject<ComponentInstancePtr<Connection>>,
    // providers can also be referred to by name
    #[gone(name = "factory", extend = "orders")]
    orders: Inject<ComponentInstancePtr<Connection>>,
    #[gone]
    port: Inject<u16>,
}

fn main() {
    let mut cemetery = Cemetery::new();
    cemetery
        .register(ConnectionFactory, GonerOptions::new().name("factory"))
        .expect("error registering factory");

    let repository = cemetery
        .register(Repository::default(), GonerOptions::new())
        .expect("error registering repository");

    cemetery.install().expect("error installing components");

    println!("users: {}", repository.users.url);
    println!("orders: {}", repository.orders.url);
    println!("port: {}", *repository.port);
}
