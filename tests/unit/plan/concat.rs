use super::*;

fn slides(paths: &[&str]) -> Vec<Slide> {
    paths
        .iter()
        .enumerate()
        .map(|(ordinal, p)| Slide {
            ordinal,
            path: PathBuf::from(p),
        })
        .collect()
}

#[test]
fn script_has_n_plus_one_file_lines_with_terminator() {
    let plan = EditPlan::from_slides(&slides(&["/w/slide-0.png", "/w/slide-1.png"]), 2.0).unwrap();
    let script = plan.to_concat_script();

    assert_eq!(
        script,
        "file '/w/slide-0.png'\nduration 2\nfile '/w/slide-1.png'\nduration 2\nfile '/w/slide-1.png'\n"
    );

    let lines: Vec<&str> = script.lines().collect();
    assert_eq!(lines.iter().filter(|l| l.starts_with("file ")).count(), 3);
    assert_eq!(lines.last(), Some(&"file '/w/slide-1.png'"));
}

#[test]
fn single_slide_still_gets_terminator() {
    let plan = EditPlan::from_slides(&slides(&["/w/slide-0.png"]), 2.0).unwrap();
    assert_eq!(plan.entries().len(), 2);
    assert_eq!(plan.entries()[0].duration_secs, Some(2.0));
    assert_eq!(plan.entries()[1].duration_secs, None);
    assert_eq!(plan.entries()[0].path, plan.entries()[1].path);
}

#[test]
fn order_follows_slides_not_names() {
    let plan = EditPlan::from_slides(&slides(&["/w/b.png", "/w/a.png", "/w/c.png"]), 2.0).unwrap();
    let order: Vec<_> = plan.slide_paths().map(|p| p.to_string_lossy().into_owned()).collect();
    assert_eq!(order, ["/w/b.png", "/w/a.png", "/w/c.png"]);
    assert_eq!(plan.total_duration_secs(), 6.0);
}

#[test]
fn fractional_duration_is_written_verbatim() {
    let plan = EditPlan::from_slides(&slides(&["/w/s.png"]), 1.5).unwrap();
    assert!(plan.to_concat_script().contains("duration 1.5\n"));
}

#[test]
fn empty_slides_or_bad_duration_are_rejected() {
    assert!(EditPlan::from_slides(&[], 2.0).is_err());
    assert!(EditPlan::from_slides(&slides(&["/w/s.png"]), 0.0).is_err());
    assert!(EditPlan::from_slides(&slides(&["/w/s.png"]), f64::NAN).is_err());
}

#[test]
fn single_quotes_use_four_char_escape_and_round_trip() {
    let path = "/tmp/it's a 'dir'/slide-0.png";
    assert_eq!(
        escape_concat_path(path),
        r"/tmp/it'\''s a '\''dir'\''/slide-0.png"
    );

    let plan = EditPlan::from_slides(&slides(&[path]), 2.0).unwrap();
    let script = plan.to_concat_script();
    assert!(script.starts_with(r"file '/tmp/it'\''s a '\''dir'\''/slide-0.png'"));

    let reparsed = EditPlan::parse(&script).unwrap();
    assert_eq!(reparsed, plan);
    assert_eq!(reparsed.entries()[0].path, PathBuf::from(path));
}

#[test]
fn parse_skips_header_comments_and_blanks() {
    let plan = EditPlan::parse("ffconcat version 1.0\n\n# slides\nfile a.png\nduration 3\nfile 'b c.png'\n")
        .unwrap();
    assert_eq!(plan.entries().len(), 2);
    assert_eq!(plan.entries()[0].path, PathBuf::from("a.png"));
    assert_eq!(plan.entries()[0].duration_secs, Some(3.0));
    assert_eq!(plan.entries()[1].path, PathBuf::from("b c.png"));
}

#[test]
fn parse_rejects_garbage() {
    assert!(EditPlan::parse("duration 2\n").is_err());
    assert!(EditPlan::parse("file 'unterminated\n").is_err());
    assert!(EditPlan::parse("file a.png\nduration soon\n").is_err());
    assert!(EditPlan::parse("inpoint 3\n").is_err());
}

#[test]
fn write_to_creates_plan_file() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join(PLAN_FILE_NAME);
    let plan = EditPlan::from_slides(&slides(&["/w/slide-0.png"]), 2.0).unwrap();
    plan.write_to(&target).unwrap();
    assert_eq!(std::fs::read_to_string(&target).unwrap(), plan.to_concat_script());
}

#[test]
fn write_to_missing_dir_is_workspace_error() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("missing").join(PLAN_FILE_NAME);
    let plan = EditPlan::from_slides(&slides(&["/w/slide-0.png"]), 2.0).unwrap();
    assert!(matches!(
        plan.write_to(&target),
        Err(CardreelError::Workspace(_))
    ));
}

#[test]
fn line_breaks_in_paths_are_rejected() {
    let err = EditPlan::from_slides(&slides(&["/w/odd\nname/slide-0.png"]), 2.0).unwrap_err();
    assert!(matches!(err, CardreelError::Workspace(_)));
}

#[cfg(unix)]
#[test]
fn non_utf8_paths_are_rejected_before_any_script_is_written() {
    use std::{ffi::OsStr, os::unix::ffi::OsStrExt as _};

    let slide = Slide {
        ordinal: 0,
        path: PathBuf::from(OsStr::from_bytes(b"/w/\xff\xfe/slide-0.png")),
    };
    let err = EditPlan::from_slides(&[slide], 2.0).unwrap_err();
    assert!(matches!(err, CardreelError::Workspace(_)), "{err}");
}
