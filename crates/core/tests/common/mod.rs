/// DSL macros for building test schedules.
///
/// # Syntax
///
/// ```ignore
/// schedule!("E_1": r(0, X), w(1, X), c(0))
/// ```
///
/// - `r(n, obj)` → `Action::read("tn", "obj")`
/// - `w(n, obj)` → `Action::write("tn", "obj")`
/// - `c(n)`      → `Action::commit("tn")`
///
/// Build a single Action.
#[macro_export]
macro_rules! act {
    (r($t:literal, $obj:ident)) => {
        tscop_core::schedule::Action::read(format!("t{}", $t), stringify!($obj).to_string())
    };
    (w($t:literal, $obj:ident)) => {
        tscop_core::schedule::Action::write(format!("t{}", $t), stringify!($obj).to_string())
    };
    (c($t:literal)) => {
        tscop_core::schedule::Action::commit(format!("t{}", $t))
    };
}

/// Build a Schedule with moments assigned in order.
#[macro_export]
macro_rules! schedule {
    ($id:literal : $($kind:ident($($args:tt)*)),* $(,)?) => {
        tscop_core::schedule::Schedule::from_actions(
            $id.to_string(),
            vec![$($crate::act!($kind($($args)*))),*],
        )
    };
}

/// Timestamp table from `(transaction, timestamp)` pairs.
#[allow(dead_code)]
pub fn table(entries: &[(&str, i64)]) -> tscop_core::TimestampTable {
    let (ids, timestamps): (Vec<String>, Vec<i64>) = entries
        .iter()
        .map(|(id, ts)| ((*id).to_string(), *ts))
        .unzip();
    tscop_core::TimestampTable::from_declarations(ids, &timestamps)
        .expect("test tables have unique ids")
}

#[allow(dead_code)]
pub fn objects(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| (*s).to_string()).collect()
}
