use assert_cmd::Command;
use predicates::str::contains;

fn cmd() -> Command {
    Command::cargo_bin("gtour").unwrap()
}

#[test]
fn help_lists_subcommands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("serve"))
        .stdout(contains("clusters"))
        .stdout(contains("plan"));
}

#[test]
fn plan_requires_a_cluster_selection() {
    cmd()
        .args(["plan", "--start", "Dinh Độc Lập", "--end", "Chợ Bến Thành"])
        .assert()
        .failure()
        .stderr(contains("Vui lòng chọn ít nhất 1 cụm điểm tham quan."));
}

#[test]
fn rejects_unknown_optimize_value() {
    cmd()
        .args([
            "plan",
            "--start",
            "Dinh Độc Lập",
            "--end",
            "Chợ Bến Thành",
            "--clusters",
            "cluster_q7",
            "--optimize",
            "fuel",
        ])
        .assert()
        .failure()
        .stderr(contains("invalid optimize criterion 'fuel'"));
}

#[test]
fn unreachable_server_reports_an_error() {
    cmd()
        .args(["clusters", "--api-url", "http://127.0.0.1:1"])
        .assert()
        .failure()
        .stderr(contains("Lỗi:"));
}
