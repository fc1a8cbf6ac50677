//! End-to-end behavior through [`crate::Brain`]: registration, sorting and
//! matching together.

use crate::{Brain, Context, Error, Options, ResolveIssue};

fn brain(triggers: &[(&str, &str, &str)]) -> Brain {
    let mut brain = Brain::new();
    for &(topic, pattern, reply) in triggers {
        brain.register_trigger(topic, pattern, [reply], None).unwrap();
    }
    brain
}

fn reply(brain: &Brain, topic: &str, input: &str) -> Option<String> {
    brain.match_input(topic, input).unwrap().map(|m| m.responses[0].clone())
}

fn patterns(brain: &Brain, topic: &str) -> Vec<String> {
    brain.sorted_triggers(topic).unwrap().into_iter().map(|t| t.pattern).collect()
}

#[test]
fn sorting_is_idempotent() {
    let mut brain = brain(&[
        ("random", "*", "fallback"),
        ("random", "hello *", "greeting"),
        ("random", "hello there bot", "exact"),
        ("random", "[please] help", "help"),
    ]);
    brain.add_inherit("random", "base");
    brain.register_trigger("base", "_ *", ["base"], None).unwrap();

    brain.sort_all();
    let first = brain.sorted_triggers("random").unwrap();
    brain.sort_all();
    assert_eq!(brain.sorted_triggers("random").unwrap(), first);
}

#[test]
fn more_literal_words_rank_first() {
    let mut brain = brain(&[
        ("random", "*", "fallback"),
        ("random", "hello *", "greeting"),
        ("random", "hello there bot", "exact"),
        ("random", "hello _ bot", "alpha"),
    ]);
    brain.sort_all();

    assert_eq!(patterns(&brain, "random"), vec!["hello there bot", "hello _ bot", "hello *", "*"]);
    assert_eq!(reply(&brain, "random", "Hello there, bot!").as_deref(), Some("exact"));
    assert_eq!(reply(&brain, "random", "hello you bot").as_deref(), Some("alpha"));
    assert_eq!(reply(&brain, "random", "hello 42 bot").as_deref(), Some("greeting"));
    assert_eq!(reply(&brain, "random", "good night").as_deref(), Some("fallback"));
}

#[test]
fn alpha_wildcard_skips_digits() {
    let mut brain = brain(&[("random", "my name is _", "name")]);
    brain.sort_all();

    assert!(brain.match_input("random", "my name is Bob 123").unwrap().is_none());
    assert!(brain.match_input("random", "my name is 123").unwrap().is_none());
    let hit = brain.match_input("random", "my name is Bob").unwrap().unwrap();
    assert_eq!(hit.star(1), Some("bob"));
    let hit = brain.match_input("random", "My name is Bob Lee").unwrap().unwrap();
    assert_eq!(hit.star(1), Some("bob lee"));
}

#[test]
fn number_wildcard_captures_digits() {
    let mut brain = brain(&[("random", "my age is #", "age")]);
    brain.sort_all();

    let hit = brain.match_input("random", "my age is 27").unwrap().unwrap();
    assert_eq!(hit.star(1), Some("27"));
    assert!(brain.match_input("random", "my age is old").unwrap().is_none());
}

#[test]
fn captures_follow_declaration_order() {
    let mut brain = brain(&[("random", "_ told me to say *", "say")]);
    brain.sort_all();

    let hit = brain.match_input("random", "Bob told me to say hello man").unwrap().unwrap();
    assert_eq!(hit.captures, vec!["bob".to_string(), "hello man".to_string()]);
    assert_eq!(hit.star(0), None);
    assert_eq!(hit.star(3), None);
}

#[test]
fn own_triggers_beat_inherited_ones() {
    let mut brain = brain(&[("alpha", "hello *", "alpha"), ("beta", "hello bot", "beta")]);
    brain.add_inherit("alpha", "beta");
    brain.sort_all();

    let hit = brain.match_input("alpha", "hello bot").unwrap().unwrap();
    assert_eq!(hit.owner, "alpha");
    assert_eq!(hit.depth, 0);
    assert_eq!(hit.responses, vec!["alpha".to_string()]);

    let hit = brain.match_input("alpha", "hello").unwrap();
    assert!(hit.is_none());

    let sorted = brain.sorted_triggers("alpha").unwrap();
    assert_eq!(sorted.iter().map(|t| (t.owner.as_str(), t.depth)).collect::<Vec<_>>(), vec![("alpha", 0), ("beta", 1)]);
}

#[test]
fn included_triggers_rank_with_own() {
    let mut brain = brain(&[("alpha", "hello *", "alpha"), ("beta", "hello bot", "beta")]);
    brain.add_include("alpha", "beta");
    brain.sort_all();

    let hit = brain.match_input("alpha", "hello bot").unwrap().unwrap();
    assert_eq!((hit.topic.as_str(), hit.owner.as_str()), ("alpha", "beta"));
    assert_eq!(reply(&brain, "alpha", "hello you").as_deref(), Some("alpha"));
    // beta does not see alpha's triggers
    assert_eq!(reply(&brain, "beta", "hello you"), None);
}

#[test]
fn long_inherit_chain_is_cut_and_reported() {
    let mut brain = Brain::new();
    for i in 0..60 {
        brain.add_inherit(&format!("t{i}"), &format!("t{}", i + 1));
    }
    brain.register_trigger("t0", "hi", ["top"], None).unwrap();
    brain.register_trigger("t60", "bye", ["bottom"], None).unwrap();

    let metrics = brain.sort_all();
    assert!(metrics.hit_recursion_limit());
    let t0 = metrics.topic("t0").unwrap();
    assert!(t0.issues.contains(&ResolveIssue::DepthExceeded { topic: "t51".into() }));

    assert_eq!(reply(&brain, "t0", "hi").as_deref(), Some("top"));
    assert_eq!(reply(&brain, "t0", "bye"), None);
    assert_eq!(reply(&brain, "t59", "bye").as_deref(), Some("bottom"));
}

#[test]
fn recursion_limit_is_configurable() {
    let mut brain = Brain::with_options(Options { recursion_limit: 2, ..Options::default() });
    brain.add_inherit("a", "b");
    brain.add_inherit("b", "c");
    brain.add_inherit("c", "d");
    brain.register_trigger("d", "hi", ["d"], None).unwrap();

    let metrics = brain.sort_all();
    assert!(metrics.topic("a").unwrap().issues.iter().any(|i| matches!(i, ResolveIssue::DepthExceeded { .. })));
    assert!(metrics.topic("b").unwrap().issues.is_empty());
    assert_eq!(reply(&brain, "b", "hi").as_deref(), Some("d"));
}

#[test]
fn cyclic_includes_still_sort() {
    let mut brain = brain(&[("a", "from a", "a"), ("b", "from b", "b")]);
    brain.add_include("a", "b");
    brain.add_include("b", "a");

    let metrics = brain.sort_all();
    assert!(metrics.issues().any(|i| matches!(i, ResolveIssue::Cycle { .. })));
    assert!(!metrics.hit_recursion_limit());
    assert_eq!(reply(&brain, "a", "from b").as_deref(), Some("b"));
    assert_eq!(reply(&brain, "b", "from a").as_deref(), Some("a"));
}

#[test]
fn diamond_includes_list_each_trigger_once() {
    let mut brain = brain(&[("d", "hi", "d")]);
    brain.add_include("a", "b");
    brain.add_include("a", "c");
    brain.add_include("b", "d");
    brain.add_include("c", "d");

    let metrics = brain.sort_all();
    assert_eq!(patterns(&brain, "a"), vec!["hi"]);
    assert_eq!(metrics.topic("a").unwrap().duplicates, 1);
    assert!(metrics.issues().next().is_none());
}

#[test]
fn previous_reply_selects_contextual_trigger() {
    let mut brain = brain(&[("random", "*", "fallback"), ("random", "yes", "plain yes")]);
    brain.register_trigger("random", "yes", ["glad you like *"], Some("do you like *")).unwrap();
    brain.sort_all();

    let context = Context::with_previous("Do you like cheese?");
    let hit = brain.match_with("random", "Yes!", &context).unwrap().unwrap();
    assert_eq!(hit.previous.as_deref(), Some("do you like *"));
    assert_eq!(hit.botstar(1), Some("cheese"));
    assert_eq!(hit.responses, vec!["glad you like *".to_string()]);

    let hit = brain.match_input("random", "yes").unwrap().unwrap();
    assert_eq!(hit.previous, None);
    assert_eq!(hit.responses, vec!["plain yes".to_string()]);

    let other = Context::with_previous("What time is it?");
    assert_eq!(brain.match_with("random", "yes", &other).unwrap().unwrap().responses, vec!["plain yes".to_string()]);
}

#[test]
fn arrays_resolve_at_match_time() {
    let mut brain = brain(&[("random", "i like (@colors)", "color")]);
    brain.sort_all();
    assert!(brain.match_input("random", "i like red").unwrap().is_none());

    brain.set_array("colors", ["Red", "sky blue"]);
    let hit = brain.match_input("random", "I like Sky Blue").unwrap().unwrap();
    assert_eq!(hit.star(1), Some("sky blue"));
}

#[test]
fn weight_outranks_specificity_within_a_depth() {
    let mut brain = brain(&[("random", "hello bot", "plain"), ("random", "* {weight=10}", "heavy")]);
    brain.sort_all();

    assert_eq!(patterns(&brain, "random"), vec!["*", "hello bot"]);
    assert_eq!(reply(&brain, "random", "hello bot").as_deref(), Some("heavy"));
}

#[test]
fn reregistering_replaces_responses() {
    let mut brain = brain(&[("random", "hello", "first")]);
    let id = brain.register_trigger("random", "HELLO", ["second"], None).unwrap();
    brain.sort_all();

    assert_eq!(patterns(&brain, "random").len(), 1);
    let hit = brain.match_input("random", "hello").unwrap().unwrap();
    assert_eq!((hit.trigger, hit.responses), (id, vec!["second".to_string()]));
}

#[test]
fn matching_requires_a_current_sort() {
    let mut brain = brain(&[("random", "hello", "hi")]);
    assert_eq!(brain.match_input("random", "hello"), Err(Error::SortRequired("random".into())));

    brain.sort_all();
    assert!(brain.match_input("random", "hello").unwrap().is_some());

    brain.register_trigger("random", "bye", ["bye"], None).unwrap();
    assert_eq!(brain.match_input("random", "bye"), Err(Error::SortRequired("random".into())));
    assert_eq!(brain.match_input("nowhere", "hello"), Err(Error::UnknownTopic("nowhere".into())));
}

#[test]
fn malformed_pattern_registers_nothing() {
    let mut brain = Brain::new();
    assert!(matches!(
        brain.register_trigger("random", "hello [there", ["hi"], None),
        Err(Error::MalformedPattern { .. })
    ));
    assert!(brain.list_topics().is_empty());
}

#[test]
fn topic_queries() {
    let mut brain = brain(&[("beta", "hello", "beta"), ("gamma", "hello", "gamma")]);
    brain.add_include("alpha", "beta");
    brain.add_inherit("alpha", "gamma");
    brain.add_inherit("gamma", "delta");

    assert_eq!(brain.list_topics(), vec!["beta", "gamma", "alpha", "delta"]);
    assert_eq!(brain.topic_includes("alpha"), Some(vec!["beta"]));
    assert_eq!(brain.topic_inherits("alpha"), Some(vec!["gamma"]));
    assert_eq!(brain.topic_includes("nowhere"), None);
    assert_eq!(brain.topic_tree("alpha"), Some((vec!["alpha", "beta", "gamma", "delta"], vec![])));
    assert_eq!(brain.find_owner("alpha", "Hello"), Some("gamma"));
    assert_eq!(brain.find_owner("beta", "hello"), None);
}

#[test]
fn topic_tree_reports_depth_cut() {
    let mut brain = Brain::with_options(Options { recursion_limit: 1, ..Options::default() });
    brain.add_include("a", "b");
    brain.add_inherit("b", "c");

    let (topics, issues) = brain.topic_tree("a").unwrap();
    assert_eq!(topics, vec!["a", "b"]);
    assert_eq!(issues, vec![ResolveIssue::DepthExceeded { topic: "c".into() }]);
}

#[test]
fn punctuation_inside_and_between_words() {
    let mut brain = brain(&[
        ("random", "my name is _", "name"),
        ("random", "whats up", "up"),
        ("random", "hello bot", "hello"),
        ("random", "i like c++", "cpp"),
    ]);
    brain.sort_all();

    let hit = brain.match_input("random", "my name is O'Brien").unwrap().unwrap();
    assert_eq!(hit.star(1), Some("obrien"));
    assert_eq!(reply(&brain, "random", "What's up?").as_deref(), Some("up"));
    assert_eq!(reply(&brain, "random", "hello,bot").as_deref(), Some("hello"));
    assert_eq!(reply(&brain, "random", "I like C++!").as_deref(), Some("cpp"));
}

#[test]
fn topic_names_are_case_insensitive() {
    let mut brain = Brain::new();
    brain.stream("> topic Sports\n+ goal\n- Score!\n< topic").unwrap();
    brain.register_trigger("SPORTS", "offside", ["Flag."], None).unwrap();
    brain.add_include("Random", "sports");
    brain.sort_all();

    assert_eq!(brain.list_topics(), vec!["sports", "random"]);
    let hit = brain.match_input("Sports", "offside").unwrap().unwrap();
    assert_eq!((hit.topic.as_str(), hit.owner.as_str()), ("sports", "sports"));
    assert_eq!(reply(&brain, "RANDOM", "goal").as_deref(), Some("Score!"));
}
