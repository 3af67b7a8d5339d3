//! This module contains the matching of concrete events against the
//! automaton's transition label patterns.

use std::collections::HashMap;

use crate::{
    automaton::{Automaton, Label, Pattern, Transition},
    error::invariant_violation,
    event::Event,
    value::AbstractValue,
};

/// Transition-local variable bindings produced by matching an event against
/// a transition's label pattern.
pub type TransitionContext = HashMap<String, AbstractValue>;

/// One successful match of an event against a transition.
#[derive(Clone, Debug)]
pub struct MatchedTransition<'a> {
    /// The transition whose label matched.
    pub transition: &'a Transition,

    /// The bindings produced by the match.
    pub context: TransitionContext,
}

/// Matches `event` against every transition of `automaton`, returning the
/// matches in transition declaration order.
///
/// Unlabelled transitions match every event with empty bindings. How the
/// label shapes match is described on [`match_label`].
pub(crate) fn static_match<'a>(
    automaton: &'a Automaton,
    event: &Event,
) -> Vec<MatchedTransition<'a>> {
    automaton
        .transitions()
        .iter()
        .filter_map(|transition| {
            let context = match transition.label() {
                None => Some(TransitionContext::new()),
                Some(label) => match_label(label, event),
            };
            context.map(|context| MatchedTransition {
                transition,
                context,
            })
        })
        .collect()
}

/// Matches `event` against one transition label, producing the bindings on
/// success.
///
/// Array-write labels match array-write events, binding their two formals to
/// the written array's and index's values respectively. Procedure-name
/// labels match call events whose callee's display name matches the pattern
/// in full; argument binding is then governed by the declared formals, see
/// [`bind_call`].
///
/// # Panics
///
/// Panics if an array-write label does not declare exactly two formals. The
/// automaton builder rejects such labels, so encountering one here is a
/// broken upstream invariant.
fn match_label(label: &Label, event: &Event) -> Option<TransitionContext> {
    match (label.pattern(), event) {
        (Pattern::ArrayWrite, Event::ArrayWrite { array, index }) => {
            let Some([array_formal, index_formal]) = label.formals() else {
                invariant_violation("an array-write label must declare exactly two formals");
            };

            let mut context = TransitionContext::new();
            context.insert(array_formal.clone(), *array);
            context.insert(index_formal.clone(), *index);
            Some(context)
        }
        (
            Pattern::ProcedureName(regex),
            Event::Call {
                return_value,
                arguments,
                procedure,
            },
        ) => {
            if !regex.is_match(procedure.as_str()) {
                return None;
            }
            bind_call(label.formals(), *return_value, arguments)
        }
        _ => None,
    }
}

/// Binds a matched call event's values to the label's formals.
///
/// With no declared formals the label ignores arguments and always matches
/// with empty bindings. With declared formals, the event's return value (if
/// present) binds to the last formal and the remaining formals bind
/// positionally to the arguments; any arity mismatch means no match rather
/// than an error.
fn bind_call(
    formals: Option<&[String]>,
    return_value: Option<AbstractValue>,
    arguments: &[AbstractValue],
) -> Option<TransitionContext> {
    let Some(formals) = formals else {
        return Some(TransitionContext::new());
    };

    let (positional, returned) = match return_value {
        Some(returned) => {
            // A returning call cannot match a label that has nowhere to put
            // the returned value.
            let (last, positional) = formals.split_last()?;
            (positional, Some((last, returned)))
        }
        None => (formals, None),
    };

    if positional.len() != arguments.len() {
        return None;
    }

    let mut context = TransitionContext::new();
    for (formal, argument) in positional.iter().zip(arguments) {
        context.insert(formal.clone(), *argument);
    }
    if let Some((formal, returned)) = returned {
        context.insert(formal.clone(), returned);
    }
    Some(context)
}

#[cfg(test)]
mod test {
    use crate::{
        automaton::{Automaton, LabelSpec},
        event::{Event, ProcedureName},
        monitor::matcher::static_match,
        value::ValueSource,
    };

    fn call(
        procedure: &str,
        return_value: Option<crate::value::AbstractValue>,
        arguments: Vec<crate::value::AbstractValue>,
    ) -> Event {
        Event::Call {
            return_value,
            arguments,
            procedure: ProcedureName::new(procedure),
        }
    }

    #[test]
    fn any_transitions_match_every_event() -> anyhow::Result<()> {
        let mut values = ValueSource::new();
        let automaton = Automaton::builder(2).any_transition(0, 1).build()?;

        let event = Event::ArrayWrite {
            array: values.fresh(),
            index: values.fresh(),
        };
        let matches = static_match(&automaton, &event);

        assert_eq!(matches.len(), 1);
        assert!(matches[0].context.is_empty());

        Ok(())
    }

    #[test]
    fn procedure_patterns_match_the_full_name() -> anyhow::Result<()> {
        let automaton = Automaton::builder(2)
            .transition(0, 1, LabelSpec::on_call("open.*"))
            .build()?;

        assert_eq!(static_match(&automaton, &call("open_file", None, vec![])).len(), 1);
        assert_eq!(static_match(&automaton, &call("reopen_file", None, vec![])).len(), 0);

        Ok(())
    }

    #[test]
    fn labels_without_formals_ignore_arguments() -> anyhow::Result<()> {
        let mut values = ValueSource::new();
        let automaton = Automaton::builder(2)
            .transition(0, 1, LabelSpec::on_call("f"))
            .build()?;

        let event = call("f", None, vec![values.fresh(), values.fresh()]);
        let matches = static_match(&automaton, &event);

        assert_eq!(matches.len(), 1);
        assert!(matches[0].context.is_empty());

        Ok(())
    }

    #[test]
    fn return_values_bind_to_the_last_formal() -> anyhow::Result<()> {
        let mut values = ValueSource::new();
        let argument = values.fresh();
        let returned = values.fresh();

        let automaton = Automaton::builder(2)
            .transition(0, 1, LabelSpec::on_call("f").with_formals(["x", "ret"]))
            .build()?;

        let matches = static_match(&automaton, &call("f", Some(returned), vec![argument]));

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].context.get("x"), Some(&argument));
        assert_eq!(matches[0].context.get("ret"), Some(&returned));

        Ok(())
    }

    #[test]
    fn returning_calls_do_not_match_empty_formal_lists() -> anyhow::Result<()> {
        let mut values = ValueSource::new();
        let automaton = Automaton::builder(2)
            .transition(0, 1, LabelSpec::on_call("f").with_formals(Vec::<String>::new()))
            .build()?;

        let matches = static_match(&automaton, &call("f", Some(values.fresh()), vec![]));
        assert_eq!(matches.len(), 0);

        Ok(())
    }

    #[test]
    fn arity_mismatches_are_not_matches() -> anyhow::Result<()> {
        let mut values = ValueSource::new();
        let automaton = Automaton::builder(2)
            .transition(0, 1, LabelSpec::on_call("f").with_formals(["x"]))
            .build()?;

        let event = call("f", None, vec![values.fresh(), values.fresh()]);
        assert_eq!(static_match(&automaton, &event).len(), 0);

        Ok(())
    }

    #[test]
    fn array_write_labels_bind_array_and_index() -> anyhow::Result<()> {
        let mut values = ValueSource::new();
        let array = values.fresh();
        let index = values.fresh();

        let automaton = Automaton::builder(2)
            .transition(0, 1, LabelSpec::on_array_write("a", "i"))
            .build()?;

        let matches = static_match(&automaton, &Event::ArrayWrite { array, index });

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].context.get("a"), Some(&array));
        assert_eq!(matches[0].context.get("i"), Some(&index));

        Ok(())
    }

    #[test]
    fn array_write_labels_do_not_match_calls() -> anyhow::Result<()> {
        let automaton = Automaton::builder(2)
            .transition(0, 1, LabelSpec::on_array_write("a", "i"))
            .build()?;

        assert_eq!(static_match(&automaton, &call("f", None, vec![])).len(), 0);

        Ok(())
    }
}
