//! Integration tests exercising the literal scenarios and invariants from
//! the language contract's testable-properties section, run end to end
//! through `volt::run_source` with a captured output sink.

use pretty_assertions::assert_eq;
use volt::{CollectOutput, NoInput, ScriptedInput};

fn run(source: &str) -> String {
    let mut out = CollectOutput::new();
    let mut input = NoInput;
    volt::run_source(source, &mut out, &mut input, Some(1))
        .unwrap_or_else(|err| panic!("unexpected error running:\n{source}\n\n{err}"));
    out.output().trim_end_matches('\n').to_string()
}

fn run_err(source: &str) -> String {
    let mut out = CollectOutput::new();
    let mut input = NoInput;
    match volt::run_source(source, &mut out, &mut input, Some(1)) {
        Ok(value) => panic!("expected error, got Ok({value:?})"),
        Err(message) => message,
    }
}

#[test]
fn counter_closure_keeps_captured_state_across_calls() {
    let source = r#"
func makeCounter(){ set c=0; func inc(){ set c=c+1; return c } return inc }
set f = makeCounter()
show f"{f()} {f()} {f()}"
"#;
    assert_eq!(run(source), "1 2 3");
}

#[test]
fn inheritance_and_super_chain_through_two_levels() {
    let source = r#"
class A { func init(n){ set this.n=n } func hi(){ return f"A{this.n}" } }
class B extends A { func init(n){ super.init(n+1) } func hi(){ return "B"+super.hi() } }
show (new B(1)).hi()
"#;
    assert_eq!(run(source), "BA2");
}

#[test]
fn finally_runs_after_a_caught_throw() {
    let source = r#"try { throw "x" } catch e { show f"c:{e}" } finally { show "f" }"#;
    assert_eq!(run(source), "c:x\nf");
}

#[test]
fn finally_runs_on_the_fall_through_path_too() {
    let source = r#"try { show "ok" } finally { show "f" }"#;
    assert_eq!(run(source), "ok\nf");
}

#[test]
fn finally_runs_even_when_the_throw_is_uncaught() {
    let source = r#"try { throw "boom" } finally { show "f" }"#;
    let message = run_err(source);
    assert!(message.contains("boom"));
}

#[test]
fn rethrowing_from_a_catch_block_propagates_the_new_value() {
    let source = r#"try { try { throw "a" } catch e { throw "b" } } catch e { show e }"#;
    assert_eq!(run(source), "b");
}

#[test]
fn fstring_with_nested_lambda_map_and_reduce() {
    let source = r#"show f"{[1,2,3].map((x)=>x*x).reduce((a,b)=>a+b,0)}""#;
    assert_eq!(run(source), "14");
}

#[test]
fn dict_merge_is_insertion_order_preserving_and_leaves_the_source_unchanged() {
    let source = r#"
set d1={a:1,b:2}; set d2={b:3,c:4}; set d3=d1.merge(d2)
show f"{d1} {d3}"
"#;
    assert_eq!(run(source), "{a: 1, b: 2} {a: 1, b: 3, c: 4}");
}

#[test]
fn dict_call_syntax_invokes_a_stored_callable_before_any_builtin_method() {
    let source = r#"set d={f:(x)=>x*2}; show d.f(3)"#;
    assert_eq!(run(source), "6");
}

#[test]
fn for_to_is_a_half_open_range() {
    let source = r#"set s=0; for i in 1 to 5 { set s=s+i }; show s"#;
    assert_eq!(run(source), "10");
}

#[test]
fn default_parameters_are_reevaluated_per_call() {
    let source = r#"
func makeList(items = []) {
    items.push(1)
    return items
}
show makeList()
show makeList()
"#;
    assert_eq!(run(source), "[1]\n[1]");
}

#[test]
fn string_methods_are_pure_and_chain() {
    let source = r#"
set s = "  Hello  "
show s.trim().upper()
show s
"#;
    assert_eq!(run(source), "HELLO\n  Hello  ");
}

#[test]
fn list_map_and_filter_return_fresh_lists() {
    let source = r#"
set xs = [1,2,3,4]
set doubled = xs.map((x)=>x*2)
set evens = xs.filter((x)=>x%2==0)
show xs
show doubled
show evens
"#;
    assert_eq!(run(source), "[1, 2, 3, 4]\n[2, 4, 6, 8]\n[2, 4]");
}

#[test]
fn isinstance_is_true_across_a_transitive_extends_chain() {
    let source = r#"
class A {}
class B extends A {}
class C extends B {}
show isinstance(new C(), A)
"#;
    assert_eq!(run(source), "true");
}

#[test]
fn instance_without_tostring_formats_as_classname_of_attrs() {
    let source = r#"
class Point { func init(x, y) { set this.x = x; set this.y = y } }
show new Point(1, 2)
"#;
    assert_eq!(run(source), "Point(x=1, y=2)");
}

#[test]
fn match_falls_back_to_default_case() {
    let source = r#"
set n = 5
match n {
    case 1 { show "one" }
    case 2 { show "two" }
    default { show "other" }
}
"#;
    assert_eq!(run(source), "other");
}

#[test]
fn ask_reads_from_the_scripted_input_source() {
    let source = r#"
ask "name? " -> name
show f"hi {name}"
"#;
    let mut out = CollectOutput::new();
    let mut input = ScriptedInput::new(["Ada"]);
    let result = volt::run_source(source, &mut out, &mut input, Some(1)).expect("runs");
    let _ = result;
    assert!(out.output().contains("name? "));
    assert!(out.output().contains("hi Ada"));
}

#[test]
fn division_always_produces_a_float() {
    let source = r#"show 4/2"#;
    assert_eq!(run(source), "2");
}

#[test]
fn undefined_name_raises_a_name_error() {
    let message = run_err("show doesNotExist");
    assert!(message.contains("NameError") || message.contains("undefined"));
}
