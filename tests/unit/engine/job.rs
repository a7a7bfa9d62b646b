use super::*;
use crate::graph::filter::Filter;
use crate::graph::pad::Pad;

fn job(destination: Destination) -> EngineJob {
    EngineJob {
        input_options: vec!["-ss".into(), "5".into()],
        source: PathBuf::from("in.mp4"),
        stages: vec![
            Filter::new("vidstabdetect")
                .opt("result", "out.mp4.trf")
                .wire([Pad::named(SOURCE_LABEL)], [Pad::named(SINK_LABEL)]),
        ],
        output_options: vec!["-an".into()],
        destination,
        duration_secs: None,
        verbosity: None,
    }
}

fn strings(args: Vec<OsString>) -> Vec<String> {
    args.into_iter()
        .map(|a| a.to_string_lossy().into_owned())
        .collect()
}

#[test]
fn argv_layout_for_null_destination() {
    let args = strings(job(Destination::Null).to_args());
    assert_eq!(
        args,
        vec![
            "-hide_banner",
            "-nostats",
            "-y",
            "-progress",
            "pipe:1",
            "-ss",
            "5",
            "-i",
            "in.mp4",
            "-filter_complex",
            "[0:v]vidstabdetect=result=out.mp4.trf[vout]",
            "-map",
            "[vout]",
            "-an",
            "-f",
            "null",
            "-",
        ]
    );
}

#[test]
fn file_destination_and_verbosity() {
    let mut j = job(Destination::File(PathBuf::from("out.mp4")));
    j.verbosity = Some("verbose".into());
    let args = strings(j.to_args());
    assert_eq!(&args[5..7], &["-v", "verbose"]);
    assert_eq!(args.last().map(String::as_str), Some("out.mp4"));
    assert!(!args.contains(&"null".to_string()));
}

#[test]
fn command_line_quotes_graph() {
    let line = job(Destination::File(PathBuf::from("my out.mp4"))).command_line("ffmpeg");
    assert!(line.starts_with("ffmpeg -hide_banner"));
    assert!(line.contains("'[0:v]vidstabdetect=result=out.mp4.trf[vout]'"));
    assert!(line.ends_with("'my out.mp4'"));
}

#[test]
fn shell_quote_escapes_single_quotes() {
    assert_eq!(shell_quote("plain-arg"), "plain-arg");
    assert_eq!(shell_quote(""), "''");
    assert_eq!(shell_quote("it's"), r"'it'\''s'");
}
