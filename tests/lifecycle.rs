//! Integration tests for loading: naming, collisions, configuration and failures.

use bean_registry::{
    bean_type, BeanError, BeanFactory, BeanType, Configuration, ConfigurationManager,
    EnvConfigurationSupplier, InstantiationError, Marker, Phase, TypeDescriptor, TypeIndex,
};
use serial_test::serial;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Default)]
pub struct Mailer;
bean_type!(Mailer);

#[derive(Default)]
pub struct Scheduler;
bean_type!(Scheduler);

#[derive(Default)]
pub struct Impostor;
bean_type!(Impostor as "mailer");

pub struct Database;

impl Database {
    fn connect() -> Result<Self, std::io::Error> {
        Err(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "connection refused",
        ))
    }
}
bean_type!(Database => Database::connect);

static CONSTRUCTED: AtomicUsize = AtomicUsize::new(0);

pub struct Counted;

impl Counted {
    fn new() -> Result<Self, std::convert::Infallible> {
        CONSTRUCTED.fetch_add(1, Ordering::SeqCst);
        Ok(Counted)
    }
}
bean_type!(Counted => Counted::new);

#[test]
fn test_every_component_is_instantiated_once() {
    let factory = BeanFactory::builder()
        .catalog(
            TypeIndex::new()
                .with(Marker::Component, Mailer::descriptor())
                .with(Marker::Component, Counted::descriptor()),
        )
        .build();
    factory.load_beans().unwrap();

    assert_eq!(CONSTRUCTED.load(Ordering::SeqCst), 1);
    assert_eq!(factory.len(), 3);

    let mailer: Arc<Mailer> = factory.get_bean_by_name("mailer").unwrap();
    let again: Arc<Mailer> = factory.get_bean().unwrap();
    assert!(Arc::ptr_eq(&mailer, &again));

    // a rejected second load constructs nothing
    assert!(factory.load_beans().is_err());
    assert_eq!(CONSTRUCTED.load(Ordering::SeqCst), 1);
}

#[test]
fn test_name_collision_overwrites() {
    let factory = BeanFactory::builder()
        .catalog(
            TypeIndex::new()
                .with(Marker::Component, Mailer::descriptor())
                .with(Marker::Component, Scheduler::descriptor())
                .with(Marker::Component, Impostor::descriptor()),
        )
        .build();
    factory.load_beans().unwrap();

    assert_eq!(factory.len(), 3);
    // the overwritten entry keeps its position
    assert_eq!(factory.bean_names()[..2], ["mailer", "scheduler"]);
    assert!(factory.get_bean_by_name::<Impostor>("mailer").is_ok());
    assert!(matches!(
        factory.get_bean::<Mailer>(),
        Err(BeanError::NotFound { .. })
    ));
}

#[test]
fn test_custom_naming_policy() {
    let factory = BeanFactory::builder()
        .catalog(TypeIndex::new().with(Marker::Component, Scheduler::descriptor()))
        .naming(|descriptor: &TypeDescriptor| descriptor.simple_name().to_uppercase())
        .build();
    factory.load_beans().unwrap();

    assert!(factory.contains_bean("SCHEDULER"));
}

#[test]
fn test_failing_constructor_aborts_load() {
    let _ = env_logger::builder().is_test(true).try_init();

    let factory = BeanFactory::builder()
        .catalog(
            TypeIndex::new()
                .with(Marker::Component, Mailer::descriptor())
                .with(Marker::Component, Database::descriptor())
                .with(Marker::Component, Scheduler::descriptor()),
        )
        .build();

    let err = factory.load_beans().unwrap_err();
    match &err {
        BeanError::Instantiation(InstantiationError::Constructor { type_name, source }) => {
            assert_eq!(*type_name, "lifecycle::Database");
            assert_eq!(source.to_string(), "connection refused");
        }
        other => panic!("unexpected error: {other:?}"),
    }

    assert_eq!(factory.phase(), Phase::Failed);
    assert!(matches!(
        factory.get_bean::<Mailer>(),
        Err(BeanError::Lifecycle {
            phase: Phase::Failed,
            ..
        })
    ));
    assert!(factory.apply_bean_post_processors().is_err());
    assert!(factory.load_beans().is_err());
}

#[test]
fn test_abstract_type_in_catalog_aborts_load() {
    static REPOSITORY: TypeDescriptor =
        TypeDescriptor::abstract_type("lifecycle::Repository", "Repository");

    let factory = BeanFactory::builder()
        .catalog(TypeIndex::new().with(Marker::Controller, &REPOSITORY))
        .build();

    assert!(matches!(
        factory.load_beans(),
        Err(BeanError::Instantiation(
            InstantiationError::NotConstructible { .. }
        ))
    ));
    assert_eq!(factory.phase(), Phase::Failed);
}

#[test]
fn test_configuration_bean_is_registered() {
    let supplier_calls = Arc::new(AtomicUsize::new(0));
    let calls = supplier_calls.clone();

    let factory = BeanFactory::builder()
        .catalog(TypeIndex::new())
        .configuration(move || {
            calls.fetch_add(1, Ordering::SeqCst);
            Configuration::new().with("server.port", "8080")
        })
        .build();
    factory.load_beans().unwrap();

    assert_eq!(supplier_calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        factory.bean_names(),
        ["bean_registry::config::ConfigurationManager"]
    );

    let config: Arc<ConfigurationManager> = factory.get_bean().unwrap();
    assert_eq!(config.get_int("server.port"), Some(8080));
}

#[test]
#[serial]
fn test_configuration_from_environment() {
    std::env::set_var("LIFECYCLE_TEST_DATABASE_URL", "postgres://localhost");

    let factory = BeanFactory::builder()
        .catalog(TypeIndex::new())
        .configuration(EnvConfigurationSupplier::new("LIFECYCLE_TEST"))
        .build();
    factory.load_beans().unwrap();
    std::env::remove_var("LIFECYCLE_TEST_DATABASE_URL");

    let config: Arc<ConfigurationManager> = factory.get_bean().unwrap();
    assert_eq!(config.get_str("database.url"), Some("postgres://localhost"));
}

#[test]
fn test_load_emits_instantiate_and_register_events() {
    let factory = BeanFactory::builder()
        .catalog(
            TypeIndex::new()
                .with(Marker::Component, Scheduler::descriptor())
                .with(Marker::Controller, Mailer::descriptor()),
        )
        .build();

    let events = Arc::new(Mutex::new(Vec::new()));
    let events_clone = events.clone();
    factory.set_trace_callback(move |event| {
        events_clone.lock().unwrap().push(event.to_string());
    });

    factory.load_beans().unwrap();
    factory.clear();

    let captured = events.lock().unwrap();
    assert_eq!(
        *captured,
        [
            "instantiate { type_name: lifecycle::Scheduler }",
            "register { bean_name: scheduler, type_name: lifecycle::Scheduler }",
            "instantiate { type_name: lifecycle::Mailer }",
            "register { bean_name: lifecycle::Mailer, type_name: lifecycle::Mailer }",
            "register { bean_name: bean_registry::config::ConfigurationManager, type_name: bean_registry::config::ConfigurationManager }",
            "Clearing the Registry",
        ]
    );
}
