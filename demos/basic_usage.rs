//! Basic usage example for bean-registry.
//!
//! Demonstrates:
//! - Declaring components and controllers with `component!` / `controller!`
//! - Loading the factory and wrapping beans in a post-processor proxy
//! - Looking beans up by interface, by concrete type and by name
//!
//! Run with: `RUST_LOG=debug cargo run --example basic_usage`

use bean_registry::{
    bean_type, component, controller, interface, Bean, BeanFactory, BoxError, Configuration,
    ConfigurationManager, SharedProcessor,
};
use std::sync::Arc;

pub trait Greeter: Send + Sync {
    fn greet(&self, who: &str) -> String;
}
interface!(Greeter);

#[derive(Default)]
pub struct EnglishGreeter;

impl Greeter for EnglishGreeter {
    fn greet(&self, who: &str) -> String {
        format!("Hello, {who}!")
    }
}
component!(EnglishGreeter: Greeter);

#[derive(Default)]
pub struct GreetingController;
controller!(GreetingController);

/// Proxy that logs every call before delegating.
pub struct TracedGreeter {
    target: Arc<dyn Greeter>,
}

impl Greeter for TracedGreeter {
    fn greet(&self, who: &str) -> String {
        println!("   [proxy] greet({who})");
        self.target.greet(who)
    }
}
bean_type!(abstract TracedGreeter: Greeter);

fn trace_greeters(_bean_name: &str, bean: Bean) -> Result<Bean, BoxError> {
    Ok(match bean.downcast::<dyn Greeter>() {
        Some(target) => Bean::new(TracedGreeter { target }),
        None => bean,
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("=== bean-registry: Basic Usage ===\n");

    // -------------------------------------------------------------------------
    // 1. Build and load the factory
    // -------------------------------------------------------------------------
    println!("1. Loading beans...");

    let factory = BeanFactory::builder()
        .configuration(Configuration::new().with("greeting.target", "world"))
        .post_processors(SharedProcessor::new(trace_greeters))
        .build();
    factory.set_trace_callback(|event| println!("   [trace] {event}"));

    factory.load_beans()?;

    // -------------------------------------------------------------------------
    // 2. Post-process
    // -------------------------------------------------------------------------
    println!("\n2. Applying post-processors...");

    factory.apply_bean_post_processors()?;

    // -------------------------------------------------------------------------
    // 3. Look beans up
    // -------------------------------------------------------------------------
    println!("\n3. Looking beans up...");

    let config: Arc<ConfigurationManager> = factory.get_bean()?;
    let greeter: Arc<dyn Greeter> = factory.get_bean()?;
    println!("   {}", greeter.greet(config.get_or("greeting.target", "nobody")));

    let controller: Arc<GreetingController> = factory.get_bean()?;
    println!("   controller bean found: {}", Arc::strong_count(&controller) > 1);

    println!("\n   Registered beans: {:?}", factory.bean_names());

    Ok(())
}
