//! Integration tests for tree construction, transformations and schedules.

use looptree::prelude::*;
use looptree::parse_tree;
use looptree::utils::ident::idents;
use std::cell::RefCell;

/// i0 -> i1 -> {i2 (comp00), i3 (comp01)} plus a second root j0 (comp02).
const NEST_JSON: &str = r#"{
    "computations": {
        "comp00": {"absolute_order": 1, "number_of_additions": 2},
        "comp01": {"absolute_order": 2},
        "comp02": {"absolute_order": 3}
    },
    "iterators": {
        "i0": {"parent_iterator": null, "lower_bound": 0, "upper_bound": 64,
               "child_iterators": ["i1"], "computations_list": []},
        "i1": {"parent_iterator": "i0", "lower_bound": 0, "upper_bound": 64,
               "child_iterators": ["i2", "i3"], "computations_list": []},
        "i2": {"parent_iterator": "i1", "lower_bound": 0, "upper_bound": 32,
               "child_iterators": [], "computations_list": ["comp00"]},
        "i3": {"parent_iterator": "i1", "lower_bound": 0, "upper_bound": "UNK",
               "child_iterators": [], "computations_list": ["comp01"]},
        "j0": {"parent_iterator": null, "lower_bound": 0, "upper_bound": 10,
               "child_iterators": [], "computations_list": ["comp02"]}
    }
}"#;

fn make_test_tree() -> IteratorTree {
    parse_tree(NEST_JSON).expect("fixture parses")
}

fn id(name: &str) -> Ident {
    Ident::new(name)
}

/// Service double answering every request the same way.
struct ScriptedService {
    factors: Option<(i64, i64)>,
    legal: bool,
    programs: RefCell<Vec<String>>,
}

impl ScriptedService {
    fn new(factors: Option<(i64, i64)>, legal: bool) -> Self {
        Self {
            factors,
            legal,
            programs: RefCell::new(Vec::new()),
        }
    }
}

impl CompilingService for ScriptedService {
    fn solve_skewing_factors(&self, _loop_levels: &[usize], _comps: &[Ident]) -> Result<Option<(i64, i64)>, SolverError> {
        Ok(self.factors)
    }

    fn is_legal(&self, _tree: &IteratorTree, legality_program: &str) -> Result<bool, SolverError> {
        self.programs.borrow_mut().push(legality_program.to_string());
        Ok(self.legal)
    }
}

#[test]
fn test_tree_outline() {
    let tree = make_test_tree();
    let expected = "\
-> i0(0,64)
   -> i1(0,64)
      -> i2(0,32)
         - comp00
      -> i3(0,UNK)
         - comp01
-> j0(0,10)
   - comp02
";
    assert_eq!(tree.to_string(), expected);
    assert_eq!(tree.node(&id("i3")).unwrap().upper_bound, Bound::Unknown);
    tree.check_invariants().unwrap();
}

#[test]
fn test_candidate_sections() {
    let tree = make_test_tree();
    assert_eq!(
        tree.candidate_sections().unwrap(),
        vec![
            (id("i0"), vec![idents(["i0", "i1"]), idents(["i2"]), idents(["i3"])]),
            (id("j0"), vec![idents(["j0"])]),
        ]
    );
}

#[test]
fn test_candidates_per_kind() {
    let tree = make_test_tree();

    let Candidates::Pairs(skewing) = ActionKind::Skewing.candidates(&tree).unwrap() else {
        panic!("skewing candidates are pairs");
    };
    assert_eq!(skewing[0].1, vec![(id("i0"), id("i1"))]);
    assert!(skewing[1].1.is_empty());

    let Candidates::Groups(parallel) = ActionKind::Parallelization.candidates(&tree).unwrap() else {
        panic!("parallelization candidates are groups");
    };
    assert_eq!(
        parallel[0].1,
        vec![idents(["i0"]), idents(["i1"]), idents(["i2", "i3"])]
    );
    assert_eq!(parallel[1].1, vec![idents(["j0"])]);

    let Candidates::Singles(reversal) = ActionKind::Reversal.candidates(&tree).unwrap() else {
        panic!("reversal candidates are singles");
    };
    assert_eq!(reversal[0].1, idents(["i0", "i1", "i2", "i3"]));

    let Candidates::Singles(unrolling) = ActionKind::Unrolling.candidates(&tree).unwrap() else {
        panic!("unrolling candidates are singles");
    };
    assert_eq!(unrolling[0].1, idents(["i2", "i3"]));
    assert_eq!(unrolling[1].1, idents(["j0"]));
}

#[test]
fn test_queries() {
    let tree = make_test_tree();
    assert_eq!(tree.subtree_computations(&id("i1")).unwrap(), idents(["comp00", "comp01"]));
    assert_eq!(tree.iterator_levels(&idents(["i0", "i3", "j0"])).unwrap(), vec![0, 2, 0]);
    assert_eq!(tree.root_of(&id("i3")).unwrap(), &id("i0"));
    assert_eq!(tree.iterator_at_level(&id("comp01"), 1).unwrap().id, id("i1"));
    assert!(tree.iterator_at_level(&id("comp02"), 1).is_err());
}

#[test]
fn test_construction_order() {
    let json = r#"{
        "computations": {"c": {"absolute_order": 1}},
        "iterators": {
            "i1": {"parent_iterator": "i0", "lower_bound": 0, "upper_bound": 4,
                   "child_iterators": [], "computations_list": ["c"]},
            "i0": {"parent_iterator": null, "lower_bound": 0, "upper_bound": 4,
                   "child_iterators": ["i1"], "computations_list": []}
        }
    }"#;
    let tree = parse_tree(json).unwrap();
    assert_eq!(tree.node(&id("i1")).unwrap().level, 1);

    let annotations = ProgramAnnotations::from_json(json).unwrap();
    let err = IteratorTree::from_annotations_with(&annotations, &TreeConfig::strict()).unwrap_err();
    assert_eq!(err.kind, AnnotationErrorKind::OutOfOrder);
}

#[test]
fn test_malformed_annotations() {
    let cycle = r#"{
        "computations": {"c": {"absolute_order": 1}},
        "iterators": {
            "i0": {"parent_iterator": "i1", "lower_bound": 0, "upper_bound": 4,
                   "child_iterators": ["i1"], "computations_list": []},
            "i1": {"parent_iterator": "i0", "lower_bound": 0, "upper_bound": 4,
                   "child_iterators": ["i0"], "computations_list": ["c"]}
        }
    }"#;
    let annotations = ProgramAnnotations::from_json(cycle).unwrap();
    let err = IteratorTree::from_annotations(&annotations).unwrap_err();
    assert_eq!(err.kind, AnnotationErrorKind::Cycle);

    let orphan = r#"{
        "computations": {"c": {"absolute_order": 1}, "d": {"absolute_order": 2}},
        "iterators": {
            "i0": {"parent_iterator": null, "lower_bound": 0, "upper_bound": 4,
                   "child_iterators": [], "computations_list": ["c"]}
        }
    }"#;
    let annotations = ProgramAnnotations::from_json(orphan).unwrap();
    let err = IteratorTree::from_annotations(&annotations).unwrap_err();
    assert_eq!(err.kind, AnnotationErrorKind::OrphanComputation);

    assert!(parse_tree(r#"{"computations": {}}"#).is_err());
}

#[test]
fn test_clone_and_insert_under_parent() {
    let mut tree = make_test_tree();
    let ns = Namespace::clone_n(1);
    let copy = tree.clone_subtree(&id("i1"), &ns).unwrap();

    assert_eq!(copy.roots(), &[id("i1").in_namespace(&ns)]);
    assert_eq!(copy.node(&id("i1").in_namespace(&ns)).unwrap().level, 0);
    assert_eq!(copy.absolute_order(&id("comp01").in_namespace(&ns)).unwrap(), 2);
    assert_eq!(tree.len(), 5);

    tree.insert_subtree(copy, &id("i0"), false).unwrap();
    tree.check_invariants().unwrap();

    let names: Vec<String> = tree.computations().iter().map(|c| c.to_string()).collect();
    assert_eq!(names, ["comp00", "comp01", "comp00_clone1", "comp01_clone1", "comp02"]);
    assert_eq!(tree.absolute_order(&id("comp02")).unwrap(), 5);

    let i0 = tree.node(&id("i0")).unwrap();
    assert_eq!(i0.children.len(), 2);
    let cloned_leaf = tree.node(&id("i2").in_namespace(&ns)).unwrap();
    assert_eq!(cloned_leaf.level, 2);
    assert_eq!(cloned_leaf.to_string(), "i2_clone1(0,32)");
}

#[test]
fn test_clone_and_insert_as_root() {
    let mut tree = make_test_tree();
    let ns = Namespace::clone_n(1);
    let copy = tree.clone_subtree(&id("i0"), &ns).unwrap();
    tree.insert_subtree(copy, &id("i0"), true).unwrap();
    tree.check_invariants().unwrap();

    assert_eq!(tree.roots(), &[id("i0"), id("i0").in_namespace(&ns), id("j0")]);
    assert_eq!(tree.candidate_sections().unwrap().len(), 3);
}

#[test]
fn test_insert_name_collision() {
    let mut tree = make_test_tree();
    let ns = Namespace::clone_n(1);
    let copy = tree.clone_subtree(&id("i2"), &ns).unwrap();
    tree.insert_subtree(copy.clone(), &id("i1"), false).unwrap();

    let before = tree.clone();
    let err = tree.insert_subtree(copy, &id("i1"), false).unwrap_err();
    assert!(matches!(err, LoopTreeError::Invariant(_)));
    assert_eq!(tree, before);
}

#[test]
fn test_schedule_session() {
    let mut schedule = Schedule::new(make_test_tree());
    schedule.apply(&Action::interchange("i0", "i1")).unwrap();
    schedule.apply(&Action::tiling_2d("i0", "i1", 32, 16)).unwrap();
    schedule.apply(&Action::unrolling(LoopRef::at_level("comp01", 2), 4)).unwrap();
    schedule.apply(&Action::parallelization("j0")).unwrap();

    assert_eq!(
        schedule.transcript(),
        "comp00.interchange(0, 1);\ncomp01.interchange(0, 1);\n\
         comp00.tile(0, 1, 32, 16);\ncomp01.tile(0, 1, 32, 16);\n\
         comp01.unroll(2, 4);\n\
         comp02.tag_parallel_level(0);\n"
    );
    assert_eq!(
        schedule.to_string(),
        "I(L0,L1,comps=[comp00,comp01])|T2(L0,L1,32,16,comps=[comp00,comp01])|U(L2,4,comps=[comp01])|P(L0,comps=[comp02])"
    );
}

#[test]
fn test_checked_apply_and_legality_program() {
    let mut schedule = Schedule::new(make_test_tree());
    let legal = ScriptedService::new(None, true);
    assert!(schedule.apply_checked(&Action::reversal("i3"), &legal).unwrap());

    let node = schedule.tree().node(&id("i3")).unwrap();
    assert_eq!((node.lower_bound, node.upper_bound), (Bound::Unknown, Bound::Known(0)));

    let illegal = ScriptedService::new(None, false);
    assert!(!schedule.apply_checked(&Action::parallelization("i1"), &illegal).unwrap());
    assert_eq!(schedule.len(), 1);

    let programs = illegal.programs.borrow();
    assert!(programs[0].starts_with("comp01.loop_reversal(2);\n\t"));
    assert!(programs[0].contains("loop_parallelization_is_legal(1, {&comp00, &comp01});"));
}

#[test]
fn test_solver_failure_is_catchable() {
    let tree = make_test_tree();
    let service = ScriptedService::new(None, true);
    let err = looptree::transform::skewing::with_solved_factors(&tree, "i0", "i1", &service).unwrap_err();
    assert!(err.is_solver_failure());

    let service = ScriptedService::new(Some((1, 2)), true);
    let action = looptree::transform::skewing::with_solved_factors(&tree, "i0", "i1", &service).unwrap();
    let mut schedule = Schedule::new(tree);
    let bound = schedule.apply(&action).unwrap();
    assert_eq!(bound.directives(), "comp00.skew(0, 1, 1, 2);\ncomp01.skew(0, 1, 1, 2);\n");
    assert_eq!(schedule.tree().node(&id("i1")).unwrap().upper_bound, Bound::Unknown);
}

#[test]
fn test_cannot_apply_reports_kind() {
    let tree = make_test_tree();
    let err = Action::new(ActionKind::Unrolling, vec![Param::from("i2"), Param::Factor(0)])
        .bind(&tree)
        .unwrap_err();
    match err {
        LoopTreeError::CannotApply(e) => {
            assert_eq!(e.action, ActionKind::Unrolling);
            assert!(e.to_string().ends_with("in unrolling"));
        }
        other => panic!("unexpected error: {}", other),
    }
}
