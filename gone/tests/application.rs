use config::Config;
use gone::application::{load_defaults, Application, ApplicationError};
use gone::logger::LoggerPtr;
use gone::runner::ApplicationRunner;
use gone_di::component::Daemon;
use gone_di::component_registry::GonerOptions;
use gone_di::error::InstallError;
use gone_di::field::Inject;
use gone_di::instance_provider::{ComponentInstancePtr, ErrorPtr};
use gone_di::{goner_alias, Goner};
use std::sync::Mutex;

#[derive(Default)]
struct Journal(Mutex<Vec<String>>);

impl Journal {
    fn write(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

#[derive(Goner, Default)]
struct Settings {
    #[gone(name = "config", extend = "server.port,default=8080")]
    port: Inject<u16>,
    #[gone(name = "config", extend = "server.host,default=localhost")]
    host: Inject<String>,
}

#[derive(Goner)]
#[goner(daemon)]
struct Server {
    name: &'static str,
    journal: ComponentInstancePtr<Journal>,
}

impl Daemon for Server {
    fn start(&self) -> Result<(), ErrorPtr> {
        self.journal.write(format!("start {}", self.name));
        Ok(())
    }

    fn stop(&self) -> Result<(), ErrorPtr> {
        self.journal.write(format!("stop {}", self.name));
        Ok(())
    }
}

#[derive(Goner)]
struct ReportRunner {
    #[gone]
    settings: Inject<ComponentInstancePtr<Settings>>,
    #[gone]
    logger: Inject<ComponentInstancePtr<LoggerPtr>>,
    journal: ComponentInstancePtr<Journal>,
}

#[goner_alias]
impl ApplicationRunner for ReportRunner {
    fn run(&self) -> Result<(), ErrorPtr> {
        let report = format!("serving {}:{}", *self.settings.host, *self.settings.port);
        self.logger.info(&report);
        self.journal.write(report);
        Ok(())
    }
}

fn config() -> Config {
    Config::builder()
        .set_override("server.port", 9000)
        .unwrap()
        .build()
        .unwrap()
}

fn application(journal: &ComponentInstancePtr<Journal>) -> Application {
    let mut application = Application::default();
    let cemetery = application.cemetery_mut();

    load_defaults(cemetery, config()).unwrap();

    cemetery
        .register(
            Server {
                name: "frontend",
                journal: journal.clone(),
            },
            GonerOptions::new().low_start_priority(),
        )
        .unwrap();
    cemetery
        .register(
            Server {
                name: "backend",
                journal: journal.clone(),
            },
            GonerOptions::new().high_start_priority(),
        )
        .unwrap();
    cemetery
        .register(Settings::default(), GonerOptions::new())
        .unwrap();
    cemetery
        .register(
            ReportRunner {
                settings: Inject::new(),
                logger: Inject::new(),
                journal: journal.clone(),
            },
            GonerOptions::new(),
        )
        .unwrap();

    application
}

#[test]
fn should_run_application_lifecycle() {
    let journal = ComponentInstancePtr::new(Journal::default());

    application(&journal).run().unwrap();

    assert_eq!(
        journal.entries(),
        vec![
            "start backend",
            "start frontend",
            "serving localhost:9000",
            "stop frontend",
            "stop backend",
        ]
    );
}

#[test]
fn should_stop_daemons_when_body_fails() {
    let journal = ComponentInstancePtr::new(Journal::default());
    let body_journal = journal.clone();

    let error = application(&journal)
        .run_with(move |_| {
            body_journal.write("body");
            Err(ApplicationError::RunnerError(ComponentInstancePtr::new(
                std::fmt::Error,
            )))
        })
        .unwrap_err();

    assert!(matches!(error, ApplicationError::RunnerError(_)));
    assert_eq!(
        journal.entries(),
        vec![
            "start backend",
            "start frontend",
            "body",
            "stop frontend",
            "stop backend",
        ]
    );
}

#[test]
fn should_fail_install_on_missing_config_value() {
    #[derive(Goner, Default)]
    struct Strict {
        #[gone(name = "config", extend = "missing.value")]
        value: Inject<String>,
    }

    let mut application = Application::default();
    load_defaults(application.cemetery_mut(), config()).unwrap();
    application
        .cemetery_mut()
        .register(Strict::default(), GonerOptions::new())
        .unwrap();

    let error = application.run().unwrap_err();
    assert!(matches!(
        error,
        ApplicationError::InstallError(InstallError::Aborted { .. })
    ));
}
