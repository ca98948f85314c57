/// Events emitted by the bean factory.
///
/// These events are passed to the tracing callback set via `set_trace_callback`.
///
/// # Examples
///
/// ```rust
/// use bean_registry::RegistryEvent;
///
/// let event = RegistryEvent::Scan { type_name: "app::Animal", matches: 2 };
/// assert_eq!(event.to_string(), "scan { type_name: app::Animal, matches: 2 }");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryEvent {
    /// A discovered type was constructed during load.
    Instantiate { type_name: &'static str },

    /// A bean was stored under its name during load.
    Register {
        bean_name: String,
        type_name: &'static str,
    },

    /// The registry was scanned to fill the type-match cache.
    Scan {
        type_name: &'static str,
        matches: usize,
    },

    /// A bean was requested by type.
    Get {
        type_name: &'static str,
        found: bool,
    },

    /// A bean was replaced by its post-processor's output.
    PostProcess {
        bean_name: String,
        type_name: &'static str,
    },

    /// The factory was cleared.
    Clear {},
}

impl std::fmt::Display for RegistryEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryEvent::Instantiate { type_name } => {
                write!(f, "instantiate {{ type_name: {type_name} }}")
            }
            RegistryEvent::Register {
                bean_name,
                type_name,
            } => {
                write!(f, "register {{ bean_name: {bean_name}, type_name: {type_name} }}")
            }
            RegistryEvent::Scan { type_name, matches } => {
                write!(f, "scan {{ type_name: {type_name}, matches: {matches} }}")
            }
            RegistryEvent::Get { type_name, found } => {
                write!(f, "get {{ type_name: {type_name}, found: {found} }}")
            }
            RegistryEvent::PostProcess {
                bean_name,
                type_name,
            } => {
                write!(
                    f,
                    "post_process {{ bean_name: {bean_name}, type_name: {type_name} }}"
                )
            }
            RegistryEvent::Clear {} => write!(f, "Clearing the Registry"),
        }
    }
}
