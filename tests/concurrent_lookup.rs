//! Integration tests for concurrent use of a factory: racing lifecycle calls and lookups
//! against a ready factory.

use bean_registry::{
    bean_type, interface, Bean, BeanError, BeanFactory, BeanType, BoxError, Marker, Phase,
    SharedProcessor, TypeIndex,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

pub trait Counter: Send + Sync {
    fn increment(&self) -> usize;
}
interface!(Counter);

#[derive(Default)]
pub struct RequestCounter {
    count: AtomicUsize,
}

impl Counter for RequestCounter {
    fn increment(&self) -> usize {
        self.count.fetch_add(1, Ordering::SeqCst) + 1
    }
}
bean_type!(RequestCounter: Counter);

#[derive(Default)]
pub struct Router;
bean_type!(Router);

static POOLS_OPENED: AtomicUsize = AtomicUsize::new(0);

pub struct ConnectionPool;

impl ConnectionPool {
    fn open() -> Result<Self, std::convert::Infallible> {
        POOLS_OPENED.fetch_add(1, Ordering::SeqCst);
        Ok(ConnectionPool)
    }
}
bean_type!(ConnectionPool => ConnectionPool::open);

const THREADS: usize = 8;
const ROUNDS: usize = 100;

fn ready_factory() -> Arc<BeanFactory> {
    let factory = BeanFactory::builder()
        .catalog(
            TypeIndex::new()
                .with(Marker::Component, RequestCounter::descriptor())
                .with(Marker::Controller, Router::descriptor()),
        )
        .build();
    factory.load_beans().unwrap();
    factory.apply_bean_post_processors().unwrap();
    Arc::new(factory)
}

#[test]
fn test_concurrent_get_bean_returns_the_singleton() {
    let factory = ready_factory();
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let factory = factory.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                // all threads race on the first, uncached lookup
                barrier.wait();
                for _ in 0..ROUNDS {
                    let counter: Arc<dyn Counter> = factory.get_bean().unwrap();
                    counter.increment();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let counter: Arc<dyn Counter> = factory.get_bean().unwrap();
    assert_eq!(counter.increment(), THREADS * ROUNDS + 1);
}

#[test]
fn test_concurrent_cache_fill_is_consistent() {
    let factory = ready_factory();
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let factory = factory.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                if i % 2 == 0 {
                    factory.get_beans_of_type::<dyn Counter>().unwrap().len()
                } else {
                    factory.get_beans_of_type::<Router>().unwrap().len()
                }
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), 1);
    }
    assert_eq!(factory.phase(), Phase::Ready);
}

#[test]
fn test_factory_is_shared_across_threads() {
    let factory = Arc::new(
        BeanFactory::builder()
            .catalog(TypeIndex::new().with(Marker::Component, Router::descriptor()))
            .build(),
    );

    let loader = {
        let factory = factory.clone();
        thread::spawn(move || {
            factory.load_beans().unwrap();
            factory.apply_bean_post_processors().unwrap();
        })
    };
    loader.join().unwrap();

    let reader = {
        let factory = factory.clone();
        thread::spawn(move || factory.get_bean::<Router>().is_ok())
    };
    assert!(reader.join().unwrap());
}

/// Runs `operation` on every thread at once and returns each thread's result.
fn race(
    factory: &Arc<BeanFactory>,
    operation: fn(&BeanFactory) -> Result<(), BeanError>,
) -> Vec<Result<(), BeanError>> {
    let barrier = Arc::new(Barrier::new(THREADS));
    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let factory = factory.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                operation(&factory)
            })
        })
        .collect();

    handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect()
}

#[test]
fn test_concurrent_loads_run_once() {
    let factory = Arc::new(
        BeanFactory::builder()
            .catalog(
                TypeIndex::new()
                    .with(Marker::Component, ConnectionPool::descriptor())
                    .with(Marker::Controller, Router::descriptor()),
            )
            .build(),
    );

    let results = race(&factory, BeanFactory::load_beans);

    assert_eq!(results.iter().filter(|result| result.is_ok()).count(), 1);
    for err in results.iter().filter_map(|result| result.as_ref().err()) {
        assert!(matches!(
            err,
            BeanError::Lifecycle {
                phase: Phase::Loaded,
                ..
            }
        ));
    }
    assert_eq!(POOLS_OPENED.load(Ordering::SeqCst), 1);
    assert_eq!(factory.len(), 3);
    assert_eq!(factory.phase(), Phase::Loaded);
}

#[test]
fn test_concurrent_post_processing_runs_once() {
    let visits = Arc::new(AtomicUsize::new(0));
    let visits_clone = visits.clone();

    let factory = Arc::new(
        BeanFactory::builder()
            .catalog(
                TypeIndex::new()
                    .with(Marker::Component, RequestCounter::descriptor())
                    .with(Marker::Controller, Router::descriptor()),
            )
            .post_processors(SharedProcessor::new(
                move |_bean_name: &str, bean: Bean| -> Result<Bean, BoxError> {
                    visits_clone.fetch_add(1, Ordering::SeqCst);
                    Ok(bean)
                },
            ))
            .build(),
    );
    factory.load_beans().unwrap();

    let results = race(&factory, BeanFactory::apply_bean_post_processors);

    assert_eq!(results.iter().filter(|result| result.is_ok()).count(), 1);
    for err in results.iter().filter_map(|result| result.as_ref().err()) {
        assert!(matches!(
            err,
            BeanError::Lifecycle {
                phase: Phase::Ready,
                ..
            }
        ));
    }
    assert_eq!(visits.load(Ordering::SeqCst), factory.len());
    assert_eq!(factory.phase(), Phase::Ready);
}
