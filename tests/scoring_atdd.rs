// End-to-end acceptance tests: real input files on disk, the real binary,
// and (for the annotation pipeline) stub ANNOVAR scripts in a temp dir.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn misrank() -> Command {
    Command::cargo_bin("misrank").expect("binary should exist")
}

const SCORE_HEADER: &str = "AAChange.refGene,SIFT_score,Polyphen2_HDIV_score,Polyphen2_HVAR_score,LRT_score,MutationTaster_score,MutationAssessor_score,FATHMM_score,CADD_phred";

#[test]
fn score_ranks_normalizes_and_drops_anchorless_rows() {
    let dir = TempDir::new().expect("temp dir should be created");
    let input = dir.path().join("variants.csv");
    fs::write(
        &input,
        format!(
            "{SCORE_HEADER}\n\
             V1,10,4,.,.,.,.,.,.\n\
             V2,5,4,.,.,.,.,.,.\n\
             V3,.,4,.,.,.,.,.,.\n\
             V4,10,.,.,.,.,.,.,.\n"
        ),
    )
    .expect("input should write");
    let output = dir.path().join("ranked.csv");

    misrank()
        .arg("score")
        .arg(&input)
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("# Misrank Summary"))
        .stdout(predicate::str::contains("rows dropped (missing anchor): 2"));

    let ranked = fs::read_to_string(&output).expect("ranked table should exist");
    let lines: Vec<&str> = ranked.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("variant,sift,pp2_hdiv"));
    assert_eq!(lines[1], "V1,1,1,.,.,.,.,.,.,1");
    assert_eq!(lines[2], "V2,0.5,1,.,.,.,.,.,.,0.75");
}

#[test]
fn score_renders_the_requested_charts() {
    let dir = TempDir::new().expect("temp dir should be created");
    let input = dir.path().join("variants.csv");
    fs::write(
        &input,
        format!(
            "{SCORE_HEADER}\n\
             V1,10,4,.,.,.,.,.,30\n\
             V2,5,4,.,.,.,.,.,15\n\
             V3,2,1,.,.,.,.,.,10\n"
        ),
    )
    .expect("input should write");

    misrank()
        .arg("score")
        .arg(&input)
        .arg("--output")
        .arg(dir.path().join("ranked.csv"))
        .arg("--chart-prefix")
        .arg(dir.path().join("charts"))
        .args(["--charts", "bar,heatmap,scatter,histogram"])
        .assert()
        .success();

    for suffix in ["_bar.svg", "_heatmap.svg", "_scatter.svg", "_histogram.svg"] {
        let chart = dir.path().join(format!("charts{suffix}"));
        assert!(chart.exists(), "expected chart file {}", chart.display());
    }
}

#[test]
fn score_with_no_surviving_rows_exits_with_no_data() {
    let dir = TempDir::new().expect("temp dir should be created");
    let input = dir.path().join("variants.csv");
    fs::write(
        &input,
        format!("{SCORE_HEADER}\nV1,.,4,.,.,.,.,.,.\nV2,5,.,.,.,.,.,.,.\n"),
    )
    .expect("input should write");

    misrank()
        .arg("score")
        .arg(&input)
        .arg("--output")
        .arg(dir.path().join("ranked.csv"))
        .assert()
        .code(1);
}

#[test]
fn score_rejects_an_unknown_scatter_predictor() {
    let dir = TempDir::new().expect("temp dir should be created");
    let input = dir.path().join("variants.csv");
    fs::write(&input, format!("{SCORE_HEADER}\nV1,10,4,.,.,.,.,.,.\n"))
        .expect("input should write");

    misrank()
        .arg("score")
        .arg(&input)
        .arg("--output")
        .arg(dir.path().join("ranked.csv"))
        .arg("--chart-prefix")
        .arg(dir.path().join("charts"))
        .args(["--charts", "scatter", "--scatter-predictor", "bogus"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("unknown predictor alias"));
}

#[cfg(unix)]
mod annotate {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;

    const FAKE_CONVERT: &str = r#"#!/bin/sh
out=""
while [ $# -gt 0 ]; do
  if [ "$1" = "-outfile" ]; then out="$2"; fi
  shift
done
echo "1 100 100 A T" > "$out"
"#;

    const FAKE_TABLE: &str = r#"#!/bin/sh
prefix=""
build=""
while [ $# -gt 0 ]; do
  if [ "$1" = "-out" ]; then prefix="$2"; fi
  if [ "$1" = "-buildver" ]; then build="$2"; fi
  shift
done
cat > "${prefix}.${build}_multianno.csv" <<'EOF'
Chr,Start,Func.refGene,ExonicFunc.refGene,AAChange.refGene,SIFT_score,Polyphen2_HDIV_score,Polyphen2_HVAR_score,LRT_score,MutationTaster_score,MutationAssessor_score,FATHMM_score,CADD_phred
1,100,exonic,missense_variant,p.A1B,0.9,0.8,.,.,.,.,.,20
1,200,exonic,missense_variant,p.C2D,0.45,0.8,.,.,.,.,.,10
1,300,exonic,stopgain,p.E3F,0.1,0.1,.,.,.,.,.,5
EOF
"#;

    const FAKE_TABLE_NO_PREDICTORS: &str = r#"#!/bin/sh
prefix=""
build=""
while [ $# -gt 0 ]; do
  if [ "$1" = "-out" ]; then prefix="$2"; fi
  if [ "$1" = "-buildver" ]; then build="$2"; fi
  shift
done
cat > "${prefix}.${build}_multianno.csv" <<'EOF'
Chr,Start,Func.refGene,ExonicFunc.refGene,AAChange.refGene
1,100,exonic,missense_variant,p.A1B
EOF
"#;

    fn write_script(path: &Path, body: &str) {
        fs::write(path, body).expect("script should write");
        let mut permissions = fs::metadata(path).expect("metadata").permissions();
        permissions.set_mode(0o755);
        fs::set_permissions(path, permissions).expect("chmod should succeed");
    }

    fn fake_install(dir: &Path, table_body: &str) -> (std::path::PathBuf, std::path::PathBuf) {
        let install = dir.join("annovar");
        let database = dir.join("humandb");
        fs::create_dir_all(&install).expect("install dir should create");
        fs::create_dir_all(&database).expect("database dir should create");
        write_script(&install.join("convert2annovar.pl"), FAKE_CONVERT);
        write_script(&install.join("table_annovar.pl"), table_body);
        (install, database)
    }

    #[test]
    fn annotate_pipeline_produces_a_ranked_table_and_chart() {
        let home = TempDir::new().expect("temp dir should be created");
        let dir = TempDir::new().expect("temp dir should be created");
        let (install, database) = fake_install(dir.path(), FAKE_TABLE);
        let vcf = dir.path().join("sample.vcf");
        fs::write(&vcf, "##fileformat=VCFv4.2\n").expect("vcf should write");
        let prefix = dir.path().join("sample");

        misrank()
            .env("HOME", home.path())
            .arg("annotate")
            .arg(&vcf)
            .arg("--out-prefix")
            .arg(&prefix)
            .arg("--annovar-dir")
            .arg(&install)
            .arg("--database-dir")
            .arg(&database)
            .assert()
            .success();

        let ranked = fs::read_to_string(dir.path().join("sample_ranked.csv"))
            .expect("ranked table should exist");
        let lines: Vec<&str> = ranked.lines().collect();
        // The stopgain row is filtered out; the two missense rows are ranked.
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("p.A1B,1,1"));
        assert!(lines[2].starts_with("p.C2D,0.5,1"));
        assert!(dir.path().join("sample_bar.svg").exists());
        // Intermediates were cleaned up.
        assert!(!dir.path().join("sample.avinput").exists());
    }

    #[test]
    fn conditional_annotation_skips_scoring_on_sparse_predictors() {
        let home = TempDir::new().expect("temp dir should be created");
        let dir = TempDir::new().expect("temp dir should be created");
        let (install, database) = fake_install(dir.path(), FAKE_TABLE_NO_PREDICTORS);
        let vcf = dir.path().join("sample.vcf");
        fs::write(&vcf, "##fileformat=VCFv4.2\n").expect("vcf should write");

        misrank()
            .env("HOME", home.path())
            .arg("annotate")
            .arg(&vcf)
            .arg("--out-prefix")
            .arg(dir.path().join("sample"))
            .arg("--annovar-dir")
            .arg(&install)
            .arg("--database-dir")
            .arg(&database)
            .arg("--conditional")
            .assert()
            .code(1)
            .stdout(predicate::str::contains("predictor columns"));

        assert!(!dir.path().join("sample_ranked.csv").exists());
    }

    #[test]
    fn failing_annotator_surfaces_a_fatal_error() {
        let home = TempDir::new().expect("temp dir should be created");
        let dir = TempDir::new().expect("temp dir should be created");
        let (install, database) =
            fake_install(dir.path(), "#!/bin/sh\necho annovar exploded >&2\nexit 1\n");
        let vcf = dir.path().join("sample.vcf");
        fs::write(&vcf, "##fileformat=VCFv4.2\n").expect("vcf should write");

        misrank()
            .env("HOME", home.path())
            .arg("annotate")
            .arg(&vcf)
            .arg("--out-prefix")
            .arg(dir.path().join("sample"))
            .arg("--annovar-dir")
            .arg(&install)
            .arg("--database-dir")
            .arg(&database)
            .assert()
            .code(3)
            .stderr(predicate::str::contains("annotation failed"));
    }
}
