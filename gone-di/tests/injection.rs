#[cfg(feature = "derive")]
mod injection_test {
    use gone_di::cemetery::Cemetery;
    use gone_di::component::Initiator;
    use gone_di::component_registry::GonerOptions;
    use gone_di::error::{InstallError, RegistryError};
    use gone_di::field::{Inject, InjectMap, InjectVec};
    use gone_di::instance_provider::{
        ComponentInstancePtr, ErrorPtr, TypedComponentInstanceProvider,
    };
    use gone_di::{goner_alias, Goner};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Goner, Default)]
    struct Worker {
        id: u8,
    }

    #[derive(Goner, Default)]
    struct Boss {
        #[gone]
        workers: InjectVec<ComponentInstancePtr<Worker>>,
        #[gone(name = "w2")]
        second: Inject<ComponentInstancePtr<Worker>>,
    }

    trait Greeter {
        fn greet(&self) -> String;
    }

    #[derive(Goner)]
    #[goner(name = "english")]
    struct English;

    #[goner_alias(default)]
    impl Greeter for English {
        fn greet(&self) -> String {
            "hello".to_string()
        }
    }

    #[derive(Goner)]
    #[goner(name = "french")]
    struct French;

    #[goner_alias]
    impl Greeter for French {
        fn greet(&self) -> String {
            "bonjour".to_string()
        }
    }

    #[derive(Goner, Default)]
    struct Greetings {
        #[gone]
        default: Inject<ComponentInstancePtr<dyn Greeter + Send + Sync>>,
        #[gone]
        all: InjectVec<ComponentInstancePtr<dyn Greeter + Send + Sync>>,
        #[gone(name = "fr*")]
        by_pattern: InjectMap<ComponentInstancePtr<dyn Greeter + Send + Sync>>,
        #[gone(name = "french")]
        french: Inject<ComponentInstancePtr<dyn Greeter + Send + Sync>>,
    }

    #[derive(Goner, Default)]
    struct Optional {
        #[gone(allow_nil)]
        boss: Inject<ComponentInstancePtr<Boss>>,
        #[gone(name = "nobody", allow_nil)]
        nobody: Inject<ComponentInstancePtr<Worker>>,
    }

    #[derive(Goner, Default)]
    struct Required {
        #[gone]
        boss: Inject<ComponentInstancePtr<Boss>>,
    }

    #[derive(Goner, Default)]
    struct Pool {
        #[gone(name = "foo-*")]
        workers: InjectMap<ComponentInstancePtr<Worker>>,
        #[gone(name = "foo-?23")]
        single: Inject<ComponentInstancePtr<Worker>>,
    }

    #[derive(Goner)]
    #[goner(name)]
    struct SelfNamedService;

    #[derive(Goner, Default)]
    struct Pair(
        #[gone(name = "w1")] Inject<ComponentInstancePtr<Worker>>,
        #[gone(name = "w2")] Inject<ComponentInstancePtr<Worker>>,
    );

    static INITIALIZED: AtomicUsize = AtomicUsize::new(0);

    #[derive(Goner, Default)]
    #[goner(init)]
    struct Counted {
        #[gone(name = "w1")]
        worker: Inject<ComponentInstancePtr<Worker>>,
    }

    impl Initiator for Counted {
        fn init(&self) -> Result<(), ErrorPtr> {
            assert!(self.worker.get().is_some());
            INITIALIZED.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn register_workers(cemetery: &mut Cemetery, names: &[&str]) {
        for (id, name) in names.iter().enumerate() {
            cemetery
                .register(Worker { id: id as u8 + 1 }, GonerOptions::new().name(*name))
                .unwrap();
        }
    }

    #[derive(Goner, Default)]
    struct Roster {
        #[gone(name = "*")]
        by_label: InjectMap<ComponentInstancePtr<Worker>>,
    }

    #[test]
    fn should_inject_all_workers_in_registration_order() {
        let mut cemetery = Cemetery::new();
        let boss = cemetery.register(Boss::default(), GonerOptions::new()).unwrap();
        register_workers(&mut cemetery, &["w1", "w2"]);

        cemetery.install().unwrap();

        assert_eq!(boss.workers.len(), 2);
        assert_eq!(
            boss.workers.iter().map(|worker| worker.id).collect::<Vec<_>>(),
            vec![1, 2]
        );
        assert_eq!(boss.second.id, 2);
    }

    #[test]
    fn should_inject_aliases() {
        let mut cemetery = Cemetery::new();
        cemetery.register(French, GonerOptions::new()).unwrap();
        cemetery.register(English, GonerOptions::new()).unwrap();
        let greetings = cemetery
            .register(Greetings::default(), GonerOptions::new())
            .unwrap();

        cemetery.install().unwrap();

        assert_eq!(greetings.default.greet(), "hello");
        assert_eq!(
            greetings
                .all
                .iter()
                .map(|greeter| greeter.greet())
                .collect::<Vec<_>>(),
            vec!["bonjour", "hello"]
        );
        assert_eq!(greetings.by_pattern.len(), 1);
        assert_eq!(greetings.by_pattern["french"].greet(), "bonjour");
        assert_eq!(greetings.french.greet(), "bonjour");
        assert_eq!(
            cemetery
                .primary_instance_typed::<dyn Greeter + Send + Sync>()
                .unwrap()
                .greet(),
            "hello"
        );
    }

    #[test]
    fn should_leave_nil_allowed_fields_empty() {
        let mut cemetery = Cemetery::new();
        let optional = cemetery
            .register(Optional::default(), GonerOptions::new())
            .unwrap();

        cemetery.install().unwrap();

        assert!(optional.boss.get().is_none());
        assert!(optional.nobody.get().is_none());
    }

    #[test]
    fn should_fail_on_unsatisfied_dependency() {
        let mut cemetery = Cemetery::new();
        cemetery
            .register(Required::default(), GonerOptions::new())
            .unwrap();

        let error = cemetery.install().unwrap_err();

        assert!(matches!(
            error.cause(),
            InstallError::UnsatisfiedDependency { field, .. } if field == "boss"
        ));
    }

    #[test]
    fn should_match_wildcards() {
        let mut cemetery = Cemetery::new();
        register_workers(&mut cemetery, &["foo-1", "bar-1", "foo-123", "foo-1234"]);
        let pool = cemetery.register(Pool::default(), GonerOptions::new()).unwrap();

        cemetery.install().unwrap();

        let mut names = pool.workers.keys().cloned().collect::<Vec<_>>();
        names.sort();
        assert_eq!(names, vec!["foo-1", "foo-123", "foo-1234"]);
        assert_eq!(pool.single.id, 3);
    }

    #[test]
    fn should_reject_duplicate_names() {
        let mut cemetery = Cemetery::new();
        register_workers(&mut cemetery, &["w1"]);

        assert_eq!(
            cemetery
                .register(Worker::default(), GonerOptions::new().name("w1"))
                .err(),
            Some(RegistryError::AlreadyRegistered {
                name: "w1".to_string()
            })
        );
    }

    #[test]
    fn should_supersede_replaced_component() {
        let mut cemetery = Cemetery::new();
        let boss = cemetery.register(Boss::default(), GonerOptions::new()).unwrap();
        register_workers(&mut cemetery, &["w1", "w2"]);
        cemetery
            .register(
                Worker { id: 20 },
                GonerOptions::new().name("w2").force_replace(),
            )
            .unwrap();

        cemetery.install().unwrap();

        assert_eq!(
            boss.workers.iter().map(|worker| worker.id).collect::<Vec<_>>(),
            vec![1, 20]
        );
        assert_eq!(boss.second.id, 20);
        assert_eq!(cemetery.instance_by_name_typed::<Worker>("w2").unwrap().id, 20);
    }

    #[test]
    fn should_use_derived_name() {
        let mut cemetery = Cemetery::new();
        cemetery
            .register(SelfNamedService, GonerOptions::new())
            .unwrap();

        assert!(cemetery
            .registry()
            .coffin_by_name("self_named_service")
            .is_some());
    }

    #[test]
    fn should_inject_tuple_fields() {
        let mut cemetery = Cemetery::new();
        register_workers(&mut cemetery, &["w1", "w2"]);
        let pair = cemetery.register(Pair::default(), GonerOptions::new()).unwrap();

        cemetery.install().unwrap();

        assert_eq!((pair.0.id, pair.1.id), (1, 2));
    }

    #[test]
    fn should_not_reinstall_installed_components() {
        let mut cemetery = Cemetery::new();
        register_workers(&mut cemetery, &["w1"]);
        let counted = cemetery.register(Counted::default(), GonerOptions::new()).unwrap();

        let before = INITIALIZED.load(Ordering::SeqCst);
        cemetery.install().unwrap();
        cemetery.install().unwrap();

        assert_eq!(INITIALIZED.load(Ordering::SeqCst), before + 1);
        assert_eq!(counted.worker.id, 1);
    }

    #[test]
    fn should_key_unnamed_sources_by_type_and_skip_duplicates() {
        let mut cemetery = Cemetery::new();
        let first = cemetery
            .register_ptr(ComponentInstancePtr::new(Worker { id: 1 }), GonerOptions::new())
            .unwrap();
        let second = cemetery
            .register_ptr(ComponentInstancePtr::new(Worker { id: 2 }), GonerOptions::new())
            .unwrap();
        cemetery
            .register(Worker { id: 3 }, GonerOptions::new().name("w3"))
            .unwrap();
        let roster = cemetery.register(Roster::default(), GonerOptions::new()).unwrap();

        cemetery.install().unwrap();

        let label = cemetery.registry().coffin(first).label();
        assert_eq!(label, std::any::type_name::<Worker>());
        assert_eq!(cemetery.registry().coffin(second).label(), label);

        assert_eq!(roster.by_label.len(), 2);
        assert_eq!(roster.by_label[label].id, 1);
        assert_eq!(roster.by_label["w3"].id, 3);
    }
}
