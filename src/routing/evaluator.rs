use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::barrier::{Arrival, BarrierStore};
use super::state::ServiceStateTable;
use crate::composition::{CompiledComposition, Statement, StatementId};
use crate::errors::RoutingError;
use crate::name::CanonicalName;
use crate::observability::messages::routing::{BarrierCompleted, BarrierPending, BarriersDropped};
use crate::observability::messages::StructuredLog;

/// Whether an incoming message lets the owner execute.
#[derive(Debug, PartialEq)]
pub enum Admission<P> {
    /// Buffered in an AND barrier that is still waiting on other senders.
    Pending,
    /// Execute on `inputs`. `joined` names the AND statements whose barrier
    /// this message completed.
    Ready {
        inputs: Vec<(CanonicalName, P)>,
        joined: BTreeSet<StatementId>,
    },
}

/// Routing decisions for one service.
///
/// Routing happens in two phases around the engine execution: [`admit`]
/// before it (AND barriers buffer inputs until the group is complete, so the
/// engine runs once on the joined inputs) and [`destinations`] after it
/// (guards see the state the engine just reported).
///
/// [`admit`]: RoutingEvaluator::admit
/// [`destinations`]: RoutingEvaluator::destinations
pub struct RoutingEvaluator<P> {
    owner: CanonicalName,
    states: Arc<ServiceStateTable>,
    barriers: Mutex<BarrierStore<P>>,
}

impl<P: Clone> RoutingEvaluator<P> {
    pub fn new(owner: CanonicalName, states: Arc<ServiceStateTable>, barrier_ttl: Option<Duration>) -> Self {
        Self {
            owner,
            states,
            barriers: Mutex::new(BarrierStore::new(barrier_ttl)),
        }
    }

    pub fn states(&self) -> &Arc<ServiceStateTable> {
        &self.states
    }

    /// Statements active under the current service states.
    fn selected<'c>(&self, compiled: &'c CompiledComposition) -> Vec<&'c Statement> {
        let state_of = |service: &CanonicalName| self.states.get(service);
        compiled
            .instructions()
            .iter()
            .filter_map(|instruction| instruction.select(&state_of))
            .flatten()
            .collect()
    }

    /// Decide whether a message from `sender` can be executed now.
    ///
    /// # Errors
    /// * [`RoutingError::DuplicateSender`] when `sender` already delivered to
    ///   an open AND group of `communication_id`
    /// * [`RoutingError::UnexpectedSender`] when the composition has AND
    ///   statements and neither they nor any plain statement expect `sender`
    ///
    /// In both cases the message must be dropped; open groups are unchanged.
    pub fn admit(
        &self,
        compiled: &CompiledComposition,
        sender: &CanonicalName,
        communication_id: i64,
        payload: P,
    ) -> Result<Admission<P>, RoutingError> {
        let owner = self.owner.to_string();
        let mut barriers = self.barriers.lock();

        let superseded = barriers.supersede(compiled.raw());
        if superseded > 0 {
            BarriersDropped {
                owner: &owner,
                count: superseded,
                reason: "composition changed",
            }
            .log();
        }
        let expired = barriers.evict_expired(Instant::now());
        if expired > 0 {
            BarriersDropped {
                owner: &owner,
                count: expired,
                reason: "barrier TTL elapsed",
            }
            .log();
        }

        let selected = self.selected(compiled);
        let and_targets: Vec<&Statement> = selected
            .iter()
            .copied()
            .filter(|s| s.and_group.as_ref().is_some_and(|group| group.contains(sender)))
            .collect();
        let plain_accepts = compiled
            .statements()
            .any(|s| !s.is_and() && compiled.accepts(s, sender));

        if and_targets.is_empty() {
            if !plain_accepts && compiled.has_and_statements() {
                return Err(RoutingError::UnexpectedSender {
                    owner,
                    sender: sender.to_string(),
                });
            }
            return Ok(Admission::Ready {
                inputs: vec![(sender.clone(), payload)],
                joined: BTreeSet::new(),
            });
        }

        let mut joined = BTreeSet::new();
        let mut inputs: Vec<(CanonicalName, P)> = Vec::new();
        for statement in and_targets {
            let Some(group) = statement.and_group.as_ref() else {
                continue;
            };
            match barriers.arrive(statement.id, communication_id, sender, payload.clone(), group) {
                Arrival::Duplicate => {
                    return Err(RoutingError::DuplicateSender {
                        owner,
                        sender: sender.to_string(),
                        communication_id,
                    })
                }
                Arrival::Pending { arrived, expected } => BarrierPending {
                    owner: &owner,
                    sender: &sender.to_string(),
                    communication_id,
                    arrived,
                    expected,
                }
                .log(),
                Arrival::Complete(arrivals) => {
                    BarrierCompleted {
                        owner: &owner,
                        communication_id,
                        inputs: arrivals.len(),
                    }
                    .log();
                    joined.insert(statement.id);
                    for (from, data) in arrivals {
                        if !inputs.iter().any(|(seen, _)| *seen == from) {
                            inputs.push((from, data));
                        }
                    }
                }
            }
        }

        if !joined.is_empty() {
            Ok(Admission::Ready { inputs, joined })
        } else if plain_accepts {
            Ok(Admission::Ready {
                inputs: vec![(sender.clone(), payload)],
                joined,
            })
        } else {
            Ok(Admission::Pending)
        }
    }

    /// Where the owner's output goes after executing a message from
    /// `sender`. AND statements fire only when listed in `joined`.
    pub fn destinations(
        &self,
        compiled: &CompiledComposition,
        sender: &CanonicalName,
        joined: &BTreeSet<StatementId>,
    ) -> BTreeSet<CanonicalName> {
        self.selected(compiled)
            .into_iter()
            .filter(|s| {
                if s.is_and() {
                    joined.contains(&s.id)
                } else {
                    compiled.accepts(s, sender)
                }
            })
            .flat_map(|s| s.output_links.iter().cloned())
            .collect()
    }

    /// Admission and destination selection in one step, for callers that
    /// route a payload without executing anything in between.
    pub fn route(
        &self,
        compiled: &CompiledComposition,
        sender: &CanonicalName,
        communication_id: i64,
        payload: P,
    ) -> Result<BTreeSet<CanonicalName>, RoutingError> {
        match self.admit(compiled, sender, communication_id, payload)? {
            Admission::Pending => Ok(BTreeSet::new()),
            Admission::Ready { joined, .. } => Ok(self.destinations(compiled, sender, &joined)),
        }
    }

    pub fn open_barriers(&self) -> usize {
        self.barriers.lock().open_groups()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composition::compile;

    fn name(engine: &str) -> CanonicalName {
        format!("10.1.1.1_java:C:{}", engine).parse().unwrap()
    }

    fn names(engines: &[&str]) -> BTreeSet<CanonicalName> {
        engines.iter().map(|e| name(e)).collect()
    }

    fn composition(terms: &str) -> String {
        terms
            .split('+')
            .map(|term| {
                let (marker, list) = term.strip_prefix('&').map_or(("", term), |rest| ("&", rest));
                let list: Vec<String> = list.split(',').map(|e| name(e).to_string()).collect();
                format!("{}{}", marker, list.join(","))
            })
            .collect::<Vec<_>>()
            .join("+")
    }

    fn evaluator(owner: &str) -> RoutingEvaluator<String> {
        RoutingEvaluator::new(name(owner), Arc::new(ServiceStateTable::new()), None)
    }

    #[test]
    fn test_positional_routing() {
        let raw = composition("A+B+C+D");

        let b = evaluator("B");
        let compiled = compile(&raw, &name("B")).unwrap();
        assert_eq!(b.route(&compiled, &name("A"), 1, "x".into()).unwrap(), names(&["C"]));

        let d = evaluator("D");
        let compiled = compile(&raw, &name("D")).unwrap();
        assert!(d.route(&compiled, &name("C"), 1, "x".into()).unwrap().is_empty());
    }

    #[test]
    fn test_or_fan_out() {
        let b = evaluator("B");
        let compiled = compile(&composition("A+B+C,D"), &name("B")).unwrap();
        assert_eq!(b.route(&compiled, &name("A"), 1, "x".into()).unwrap(), names(&["C", "D"]));
    }

    #[test]
    fn test_and_fan_in() {
        let b = evaluator("B");
        let compiled = compile(&composition("A,E+&B+C"), &name("B")).unwrap();

        assert!(b.route(&compiled, &name("A"), 1, "a".into()).unwrap().is_empty());
        assert_eq!(b.route(&compiled, &name("E"), 1, "e".into()).unwrap(), names(&["C"]));
        assert_eq!(b.open_barriers(), 0);

        assert!(b.route(&compiled, &name("A"), 2, "a".into()).unwrap().is_empty());
        assert_eq!(b.open_barriers(), 1);
    }

    #[test]
    fn test_and_admission_joins_inputs() {
        let b = evaluator("B");
        let compiled = compile(&composition("A,E+&B+C"), &name("B")).unwrap();

        assert_eq!(b.admit(&compiled, &name("E"), 9, "e".into()).unwrap(), Admission::Pending);
        match b.admit(&compiled, &name("A"), 9, "a".into()).unwrap() {
            Admission::Ready { inputs, joined } => {
                let senders: Vec<_> = inputs.iter().map(|(n, _)| n.clone()).collect();
                assert_eq!(senders, vec![name("A"), name("E")]);
                assert_eq!(joined.len(), 1);
            }
            Admission::Pending => panic!("barrier should be complete"),
        }
    }

    #[test]
    fn test_and_mismatch_errors() {
        let b = evaluator("B");
        let compiled = compile(&composition("A,E+&B+C"), &name("B")).unwrap();

        let err = b.route(&compiled, &name("Z"), 1, "z".into()).unwrap_err();
        assert!(matches!(err, RoutingError::UnexpectedSender { .. }));

        b.route(&compiled, &name("A"), 1, "a".into()).unwrap();
        let err = b.route(&compiled, &name("A"), 1, "again".into()).unwrap_err();
        assert!(matches!(err, RoutingError::DuplicateSender { communication_id: 1, .. }));

        // The pending group survives both rejections.
        assert_eq!(b.route(&compiled, &name("E"), 1, "e".into()).unwrap(), names(&["C"]));
    }

    #[test]
    fn test_new_composition_discards_pending_groups() {
        let b = evaluator("B");
        let first = compile(&composition("A,E+&B+C"), &name("B")).unwrap();
        let second = compile(&composition("A,E+&B+D"), &name("B")).unwrap();

        b.route(&first, &name("A"), 1, "a".into()).unwrap();
        assert!(b.route(&second, &name("E"), 1, "e".into()).unwrap().is_empty());
        assert_eq!(b.route(&second, &name("A"), 1, "a".into()).unwrap(), names(&["D"]));
    }

    #[test]
    fn test_conditional_dispatch() {
        let raw = format!(
            r#"{s1};if({s1}=="FOO"){{{s1}+{s2}}}elseif({s1}=="BAR"){{{s1}+{s3}}}else{{{s1}+{s4}}}"#,
            s1 = name("S1"),
            s2 = name("S2"),
            s3 = name("S3"),
            s4 = name("S4"),
        );
        let s1 = evaluator("S1");
        let compiled = compile(&raw, &name("S1")).unwrap();
        let orchestrator: CanonicalName = "10.1.1.9_java:orchestrator:client".parse().unwrap();

        s1.states().record(&name("S1"), "BAR");
        assert_eq!(s1.route(&compiled, &orchestrator, 1, "x".into()).unwrap(), names(&["S3"]));

        s1.states().record(&name("S1"), "FOO");
        assert_eq!(s1.route(&compiled, &orchestrator, 2, "x".into()).unwrap(), names(&["S2"]));

        s1.states().record(&name("S1"), "bar");
        assert_eq!(s1.route(&compiled, &orchestrator, 3, "x".into()).unwrap(), names(&["S4"]));
    }

    #[test]
    fn test_conditional_without_else_skips() {
        let raw = format!(r#"if({a}=="GO"){{{a}+{b}}}"#, a = name("A"), b = name("B"));
        let a = evaluator("A");
        let compiled = compile(&raw, &name("A")).unwrap();
        let client: CanonicalName = "10.1.1.9_java:orchestrator:client".parse().unwrap();

        assert!(a.route(&compiled, &client, 1, "x".into()).unwrap().is_empty());
        a.states().record(&name("A"), "GO");
        assert_eq!(a.route(&compiled, &client, 2, "x".into()).unwrap(), names(&["B"]));
    }

    #[test]
    fn test_loop_routes_back() {
        let s3 = evaluator("S3");
        let compiled = compile(&composition("S1+S3+S1"), &name("S3")).unwrap();
        assert_eq!(s3.route(&compiled, &name("S1"), 1, "x".into()).unwrap(), names(&["S1"]));
    }

    #[test]
    fn test_loop_ends_at_tail_occurrence() {
        let s1 = evaluator("S1");
        let compiled = compile(&composition("S1+S3+S1"), &name("S1")).unwrap();
        let client: CanonicalName = "10.1.1.9_java:orchestrator:client".parse().unwrap();

        assert_eq!(s1.route(&compiled, &client, 1, "x".into()).unwrap(), names(&["S3"]));
        assert!(s1.route(&compiled, &name("S3"), 1, "x".into()).unwrap().is_empty());
    }

    #[test]
    fn test_chain_heads_ignore_senders_of_the_composition() {
        let raw = format!("{};{}", composition("S1+S2"), composition("S2+S1"));
        let s1 = evaluator("S1");
        let compiled = compile(&raw, &name("S1")).unwrap();
        assert!(s1.route(&compiled, &name("S2"), 1, "x".into()).unwrap().is_empty());

        let s2 = evaluator("S2");
        let compiled = compile(&raw, &name("S2")).unwrap();
        assert_eq!(s2.route(&compiled, &name("S1"), 1, "x".into()).unwrap(), BTreeSet::new());
    }
}
