use crate::analyzer::{analyze, describe_field, resolve_field, Action, Dependency};
use crate::component_registry::{describe, CoffinId, ComponentRegistry};
use crate::error::{CycleChain, InstallError};
use crate::field::{Field, FieldShape, SlotError};
use crate::graph::topological_order;
use crate::instance_provider::{AnyValue, TypeInfo};
use fxhash::FxHashSet;
use once_cell::sync::Lazy;
use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::{Cell, RefCell};
use std::panic::{self, catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error, warn};

thread_local! {
    static CAPTURING: Cell<bool> = Cell::new(false);
    static PANIC_BACKTRACE: RefCell<Option<Backtrace>> = RefCell::new(None);
}

// Records the panic site of guarded steps, then defers to the previous hook.
static BACKTRACE_HOOK: Lazy<()> = Lazy::new(|| {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        if CAPTURING.with(Cell::get) {
            PANIC_BACKTRACE.with(|slot| *slot.borrow_mut() = Some(Backtrace::force_capture()));
        }

        previous(info);
    }));
});

/// Fills and initializes all registered coffins in dependency order.
pub(crate) struct Installer<'a> {
    registry: &'a mut ComponentRegistry,
}

impl<'a> Installer<'a> {
    pub(crate) fn new(registry: &'a mut ComponentRegistry) -> Self {
        Self { registry }
    }

    pub(crate) fn install(&mut self) -> Result<(), InstallError> {
        let graph = analyze(self.registry)?;
        let order = topological_order(&graph).map_err(|cycle| {
            InstallError::CircularDependency(CycleChain(
                cycle
                    .0
                    .iter()
                    .map(|dependency| dependency.describe(self.registry))
                    .collect(),
            ))
        })?;

        let lazy_fill = self
            .registry
            .coffins()
            .filter(|(_, coffin)| coffin.is_lazy_fill())
            .map(|(id, _)| Dependency::fill(id));

        let steps: Vec<_> = order.iter().copied().chain(lazy_fill).collect();
        for (index, dependency) in steps.into_iter().enumerate() {
            self.execute(dependency).map_err(|source| {
                let component = describe(self.registry.coffin(dependency.coffin));
                error!(index, action = %dependency.action, %component, %source, "Install aborted.");

                InstallError::Aborted {
                    index,
                    action: dependency.action,
                    component,
                    source: Box::new(source),
                }
            })?;
        }

        Ok(())
    }

    fn execute(&mut self, dependency: Dependency) -> Result<(), InstallError> {
        let id = dependency.coffin;
        let coffin = self.registry.coffin(id);

        match dependency.action {
            Action::Fill if !coffin.is_filled() => {
                debug!(component = %describe(coffin), "Filling component.");

                self.guarded(id, Action::Fill, |installer| installer.fill(id))?;
                self.registry.coffin_mut(id).is_filled = true;
            }
            Action::Init if !coffin.is_initialized() => {
                debug!(component = %describe(coffin), "Initializing component.");

                self.guarded(id, Action::Init, |installer| installer.init(id))?;
                self.registry.coffin_mut(id).is_initialized = true;
            }
            _ => {}
        }

        Ok(())
    }

    fn guarded<F>(&self, id: CoffinId, phase: Action, step: F) -> Result<(), InstallError>
    where
        F: FnOnce(&Self) -> Result<(), InstallError>,
    {
        Lazy::force(&BACKTRACE_HOOK);

        let was_capturing = CAPTURING.with(|capturing| capturing.replace(true));
        let result = catch_unwind(AssertUnwindSafe(|| step(self)));
        CAPTURING.with(|capturing| capturing.set(was_capturing));

        result.unwrap_or_else(|payload| {
            let backtrace = PANIC_BACKTRACE
                .with(|slot| slot.borrow_mut().take())
                .unwrap_or_else(Backtrace::force_capture);

            Err(InstallError::PanicDuringInstall {
                component: describe(self.registry.coffin(id)),
                phase,
                message: panic_message(payload.as_ref()),
                backtrace: Arc::new(backtrace),
            })
        })
    }

    fn fill(&self, id: CoffinId) -> Result<(), InstallError> {
        let coffin = self.registry.coffin(id);
        if let Some(hook) = &coffin.hooks().before_fill {
            hook.before_fill()
                .map_err(|source| InstallError::HookFailed {
                    component: describe(coffin),
                    phase: "before fill",
                    source,
                })?;
        }

        let goner = coffin.goner().clone();
        for field in goner.fields() {
            if field.slot.is_filled() {
                continue;
            }

            let descriptor = describe_field(self.registry, id, &field)?;
            let sources = resolve_field(self.registry, id, &field, &descriptor)?;

            match field.slot.shape() {
                FieldShape::Single => {
                    if let Some(source) = sources.first() {
                        self.assign_single(id, &field, *source, descriptor.tag.extend)?;
                    }
                }
                FieldShape::Slice | FieldShape::Map => match sources.as_slice() {
                    [source] if self.delegates_to_injector(*source, &field) => {
                        self.delegate(id, &field, *source, descriptor.tag.extend)?;
                    }
                    _ => self.assign_many(id, &field, &sources, descriptor.tag.extend)?,
                },
            }
        }

        Ok(())
    }

    fn init(&self, id: CoffinId) -> Result<(), InstallError> {
        let coffin = self.registry.coffin(id);
        match &coffin.hooks().initiator {
            Some(initiator) => initiator.init().map_err(|source| InstallError::HookFailed {
                component: describe(coffin),
                phase: "init",
                source,
            }),
            None => Ok(()),
        }
    }

    fn assign_single(
        &self,
        owner: CoffinId,
        field: &Field,
        source: CoffinId,
        extend: &str,
    ) -> Result<(), InstallError> {
        let element_type = field.slot.element_type();
        let source_coffin = self.registry.coffin(source);

        if source_coffin.exposes(element_type) || source_coffin.provider_for(element_type).is_some()
        {
            let value = self.value_of(owner, field, source, extend)?;
            return self.fill_slot(owner, field, vec![value], &[source]);
        }

        self.delegate(owner, field, source, extend)
    }

    /// Checks if a field can only be filled by the field injector of the given source.
    fn delegates_to_injector(&self, source: CoffinId, field: &Field) -> bool {
        let element_type = field.slot.element_type();
        let coffin = self.registry.coffin(source);

        coffin.hooks().field_injector.is_some()
            && !coffin.exposes(element_type)
            && coffin.provider_for(element_type).is_none()
    }

    fn delegate(
        &self,
        owner: CoffinId,
        field: &Field,
        source: CoffinId,
        extend: &str,
    ) -> Result<(), InstallError> {
        let element_type = field.slot.element_type();
        let source_coffin = self.registry.coffin(source);

        match &source_coffin.hooks().field_injector {
            Some(injector) => injector
                .inject(extend, &field.meta, field.slot)
                .map_err(|error| InstallError::ProviderFailed {
                    component: describe(self.registry.coffin(owner)),
                    field: field.meta.name.to_string(),
                    provider: describe(source_coffin),
                    requested: element_type.name.to_string(),
                    source: error,
                }),
            None => Err(InstallError::UnsatisfiedDependency {
                component: describe(self.registry.coffin(owner)),
                field: field.meta.name.to_string(),
                requested: element_type.name.to_string(),
            }),
        }
    }

    fn assign_many(
        &self,
        owner: CoffinId,
        field: &Field,
        sources: &[CoffinId],
        extend: &str,
    ) -> Result<(), InstallError> {
        let mut keys = FxHashSet::default();
        let mut values = Vec::with_capacity(sources.len());
        let mut origins = Vec::with_capacity(sources.len());

        for source in sources {
            let (key, value) = self.value_of(owner, field, *source, extend)?;

            if field.slot.shape() == FieldShape::Map && !keys.insert(key.clone()) {
                warn!(
                    component = %describe(self.registry.coffin(owner)),
                    field = field.meta.name,
                    %key,
                    "Skipping value with a duplicate map key."
                );
                continue;
            }

            values.push((key, value));
            origins.push(*source);
        }

        self.fill_slot(owner, field, values, &origins)
    }

    /// Returns a value from a single source, keyed by the source name.
    fn value_of(
        &self,
        owner: CoffinId,
        field: &Field,
        source: CoffinId,
        extend: &str,
    ) -> Result<(String, AnyValue), InstallError> {
        let element_type = field.slot.element_type();
        let coffin = self.registry.coffin(source);
        let key = coffin.label().to_string();

        if let Some(value) = coffin.cast(element_type) {
            return Ok((key, value));
        }

        match coffin.provider_for(element_type) {
            Some(provider) => provider
                .provide(extend, element_type)
                .map(|value| (key, value))
                .map_err(|error| InstallError::ProviderFailed {
                    component: describe(self.registry.coffin(owner)),
                    field: field.meta.name.to_string(),
                    provider: describe(coffin),
                    requested: element_type.name.to_string(),
                    source: error,
                }),
            None => Err(InstallError::UnsatisfiedDependency {
                component: describe(self.registry.coffin(owner)),
                field: field.meta.name.to_string(),
                requested: format!("{} from {}", element_type.name, describe(coffin)),
            }),
        }
    }

    fn fill_slot(
        &self,
        owner: CoffinId,
        field: &Field,
        values: Vec<(String, AnyValue)>,
        origins: &[CoffinId],
    ) -> Result<(), InstallError> {
        field.slot.fill(values).map_err(|error| match error {
            SlotError::TypeMismatch { expected, index } => InstallError::TypeMismatch {
                component: describe(self.registry.coffin(owner)),
                field: field.meta.name.to_string(),
                expected: expected.name.to_string(),
                actual: origins
                    .get(index)
                    .map(|origin| self.provided_type(*origin, expected))
                    .unwrap_or_else(|| "an incompatible value".to_string()),
            },
            SlotError::AlreadyFilled | SlotError::InvalidArity(_) => {
                InstallError::MalformedComponent {
                    component: describe(self.registry.coffin(owner)),
                    reason: format!("field '{}': {error}", field.meta.name),
                }
            }
        })
    }

    fn provided_type(&self, origin: CoffinId, requested: TypeInfo) -> String {
        let coffin = self.registry.coffin(origin);
        match coffin.provider_for(requested).and_then(|p| p.output()) {
            Some(output) => format!("{output} from {}", describe(coffin)),
            None => format!("an incompatible value from {}", describe(coffin)),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
