use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, info};
use rhai::{Array, Dynamic, Engine, EvalAltResult, Map};

use super::{build_metadata_pair, Bridge, MetadataPair};
use crate::config::RunConfig;
use crate::GeeError;

pub type ScriptResult<T> = Result<T, Box<EvalAltResult>>;

/// The most recent error raised by a host function during a script run.
type Failure = Rc<RefCell<Option<GeeError>>>;

/// Run a whole generation: load the data, render the entry template and
/// execute its output as the driving script.
pub fn run_templated_script(config: RunConfig) -> Result<(), GeeError> {
    let bridge = Rc::new(Bridge::load(config)?);
    let script = bridge.render_entry()?;
    debug!(
        "Entry template {} rendered to {} bytes of script",
        bridge.config().entry_path().display(),
        script.len()
    );
    run_script(&bridge, &script)
}

/// Execute `script` with the host functions bound to `bridge`.
///
/// A failing host function stops the script and its error is returned as
/// is. Any other script failure becomes [`GeeError::Script`], including one
/// raised after the script caught a host error itself.
pub fn run_script(bridge: &Rc<Bridge>, script: &str) -> Result<(), GeeError> {
    let failure: Failure = Rc::new(RefCell::new(None));
    let engine = build_engine(bridge, &failure);

    engine.run(script).map_err(|err| {
        let stored = failure.borrow_mut().take();
        match stored {
            Some(host) if host.to_string() == root_message(&err) => host,
            _ => GeeError::Script { message: err.to_string() },
        }
    })
}

fn report<T>(failure: &Failure, result: Result<T, GeeError>) -> ScriptResult<T> {
    result.map_err(|err| {
        let message = err.to_string();
        *failure.borrow_mut() = Some(err);
        message.into()
    })
}

/// The message a script error was raised with, below any call frames.
fn root_message(err: &EvalAltResult) -> String {
    match err {
        EvalAltResult::ErrorInFunctionCall(_, _, inner, _) => root_message(inner),
        EvalAltResult::ErrorRuntime(value, _) => value.to_string(),
        other => other.to_string(),
    }
}

/// Text form of a script value, used for metadata values.
fn dynamic_text(value: &Dynamic) -> String {
    if value.is_unit() {
        String::new()
    } else {
        value.to_string()
    }
}

fn pairs_from_array(items: Array) -> Result<Vec<MetadataPair>, GeeError> {
    items
        .into_iter()
        .map(|item| {
            let type_name = item.type_name();
            item.try_cast::<MetadataPair>().ok_or_else(|| GeeError::Script {
                message: format!("Expected metadata pairs in the array, got {}", type_name),
            })
        })
        .collect()
}

fn pairs_from_map(map: Map) -> Vec<MetadataPair> {
    map.into_iter()
        .map(|(key, value)| build_metadata_pair(key.as_str(), dynamic_text(&value)))
        .collect()
}

fn build_engine(bridge: &Rc<Bridge>, failure: &Failure) -> Engine {
    let mut engine = Engine::new();
    engine.set_max_expr_depths(128, 64);

    engine.on_print(|text| info!(target: "geeco::script", "{}", text));
    engine.on_debug(|text, source, pos| {
        debug!(target: "geeco::script", "{} @ {}: {}", source.unwrap_or("script"), pos, text)
    });

    engine
        .register_type_with_name::<MetadataPair>("MetadataPair")
        .register_get("key", |pair: &mut MetadataPair| pair.key.clone())
        .register_get("value", |pair: &mut MetadataPair| pair.value.clone())
        .register_fn("to_string", |pair: &mut MetadataPair| pair.to_string())
        .register_fn("to_debug", |pair: &mut MetadataPair| format!("{:?}", pair));

    for name in ["BuildMetadataPair", "BuildKeyValuePair"] {
        engine.register_fn(name, |key: &str, value: Dynamic| build_metadata_pair(key, dynamic_text(&value)));
    }

    {
        let bridge = Rc::clone(bridge);
        let failure = Rc::clone(failure);
        engine.register_fn("CopyFolder", move |source: &str, dest: &str| -> ScriptResult<()> {
            report(&failure, bridge.copy_folder(source, dest))
        });
    }

    macro_rules! register_render {
        ($($pair: ident),*) => {
            for name in ["RenderTemplate", "RunTemplate"] {
                let bridge = Rc::clone(bridge);
                let failure = Rc::clone(failure);
                engine.register_fn(
                    name,
                    move |template: &str, output: &str $(, $pair: MetadataPair)*| -> ScriptResult<()> {
                        let metadata: Vec<MetadataPair> = vec![$($pair),*];
                        report(&failure, bridge.render_template(template, output, &metadata))
                    },
                );
            }
        };
    }

    register_render!();
    register_render!(a);
    register_render!(a, b);
    register_render!(a, b, c);
    register_render!(a, b, c, d);
    register_render!(a, b, c, d, e);
    register_render!(a, b, c, d, e, f);
    register_render!(a, b, c, d, e, f, g);
    register_render!(a, b, c, d, e, f, g, h);

    for name in ["RenderTemplate", "RunTemplate"] {
        {
            let bridge = Rc::clone(bridge);
            let failure = Rc::clone(failure);
            engine.register_fn(name, move |template: &str, output: &str, pairs: Array| -> ScriptResult<()> {
                let metadata = report(&failure, pairs_from_array(pairs))?;
                report(&failure, bridge.render_template(template, output, &metadata))
            });
        }
        {
            let bridge = Rc::clone(bridge);
            let failure = Rc::clone(failure);
            engine.register_fn(name, move |template: &str, output: &str, pairs: Map| -> ScriptResult<()> {
                report(&failure, bridge.render_template(template, output, &pairs_from_map(pairs)))
            });
        }
    }

    engine
}
