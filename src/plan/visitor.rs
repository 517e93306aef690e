//! Depth-first plan traversal
//!
//! `enter` runs before a node's children and may replace the node or
//! ask to skip its children. `leave` runs after the children and may
//! replace the node or stop the whole traversal by returning `false`.

use super::node::Plan;

/// Two-phase plan visitor
pub trait Visitor {
    /// Pre-order hook. Returns the node and `true` to skip its children.
    fn enter(&mut self, plan: Plan) -> (Plan, bool);

    /// Post-order hook. Returns the node and `false` to stop traversal.
    fn leave(&mut self, plan: Plan) -> (Plan, bool);
}

impl Plan {
    /// Walks the tree with `visitor`, returning the rewritten tree and
    /// whether traversal ran to completion.
    pub fn accept<V: Visitor + ?Sized>(self, visitor: &mut V) -> (Plan, bool) {
        let (plan, skip_children) = visitor.enter(self);
        if skip_children {
            return visitor.leave(plan);
        }

        let plan = match plan {
            Plan::Filter(mut filter) => {
                let (input, ok) = accept_child(filter.input, visitor);
                filter.input = input;
                if !ok {
                    return (Plan::Filter(filter), false);
                }
                Plan::Filter(filter)
            }
            Plan::Sort(mut sort) => {
                let (input, ok) = accept_child(sort.input, visitor);
                sort.input = input;
                if !ok {
                    return (Plan::Sort(sort), false);
                }
                Plan::Sort(sort)
            }
            Plan::Limit(mut limit) => {
                let (input, ok) = accept_child(limit.input, visitor);
                limit.input = input;
                if !ok {
                    return (Plan::Limit(limit), false);
                }
                Plan::Limit(limit)
            }
            Plan::Other(mut other) => {
                let mut pending = std::mem::take(&mut other.children).into_iter();
                let mut children = Vec::with_capacity(pending.len());
                let mut ok = true;
                for child in pending.by_ref() {
                    let (child, child_ok) = child.accept(visitor);
                    children.push(child);
                    if !child_ok {
                        ok = false;
                        break;
                    }
                }
                // Children after a stop are kept as-is
                children.extend(pending);
                other.children = children;
                if !ok {
                    return (Plan::Other(other), false);
                }
                Plan::Other(other)
            }
            leaf @ Plan::IndexScan(_) => leaf,
        };

        visitor.leave(plan)
    }
}

fn accept_child<V: Visitor + ?Sized>(child: Box<Plan>, visitor: &mut V) -> (Box<Plan>, bool) {
    let (plan, ok) = (*child).accept(visitor);
    (Box::new(plan), ok)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::IndexInfo;
    use std::sync::Arc;

    /// Records the enter/leave sequence
    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
        skip: Option<&'static str>,
        stop_at: Option<&'static str>,
    }

    impl Visitor for Recorder {
        fn enter(&mut self, plan: Plan) -> (Plan, bool) {
            self.events.push(format!("enter {}", plan.name()));
            let skip = self.skip == Some(plan.name());
            (plan, skip)
        }

        fn leave(&mut self, plan: Plan) -> (Plan, bool) {
            self.events.push(format!("leave {}", plan.name()));
            let ok = self.stop_at != Some(plan.name());
            (plan, ok)
        }
    }

    fn scan(name: &str) -> Plan {
        Plan::index_scan(Arc::new(IndexInfo::new(name, "t", ["a"])))
    }

    fn tree() -> Plan {
        Plan::limit(
            10,
            Plan::other(
                "Join",
                vec![
                    Plan::filter(Vec::new(), scan("i1")),
                    Plan::sort(Vec::new(), scan("i2")),
                ],
            ),
        )
    }

    #[test]
    fn test_pre_and_post_order() {
        let mut rec = Recorder::default();
        let (plan, ok) = tree().accept(&mut rec);
        assert!(ok);
        assert_eq!(plan, tree());
        assert_eq!(
            rec.events,
            vec![
                "enter Limit",
                "enter Join",
                "enter Filter",
                "enter IndexScan",
                "leave IndexScan",
                "leave Filter",
                "enter Sort",
                "enter IndexScan",
                "leave IndexScan",
                "leave Sort",
                "leave Join",
                "leave Limit",
            ]
        );
    }

    #[test]
    fn test_skip_children() {
        let mut rec = Recorder {
            skip: Some("Join"),
            ..Default::default()
        };
        let (_, ok) = tree().accept(&mut rec);
        assert!(ok);
        assert_eq!(
            rec.events,
            vec!["enter Limit", "enter Join", "leave Join", "leave Limit"]
        );
    }

    #[test]
    fn test_stop_keeps_remaining_children() {
        let mut rec = Recorder {
            stop_at: Some("Filter"),
            ..Default::default()
        };
        let (plan, ok) = tree().accept(&mut rec);
        assert!(!ok);
        // Nothing after the stop is visited, but the tree is intact
        assert_eq!(plan, tree());
        assert_eq!(rec.events.last().map(String::as_str), Some("leave Filter"));
        assert!(!rec.events.iter().any(|e| e == "enter Sort"));
    }

    struct Replacer;

    impl Visitor for Replacer {
        fn enter(&mut self, plan: Plan) -> (Plan, bool) {
            (plan, false)
        }

        fn leave(&mut self, plan: Plan) -> (Plan, bool) {
            match plan {
                Plan::Sort(sort) => (*sort.input, true),
                other => (other, true),
            }
        }
    }

    #[test]
    fn test_leave_can_replace_node() {
        let (plan, ok) = Plan::sort(Vec::new(), scan("i1")).accept(&mut Replacer);
        assert!(ok);
        assert_eq!(plan, scan("i1"));
    }
}
