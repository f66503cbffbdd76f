#![cfg(target_os = "linux")]

use std::process::Command;
use std::thread;
use std::time::{Duration, Instant};

use hostprobe::system::CensusProbe;
use hostprobe::system::platform::SysinfoTaskSource;

fn proc_state(pid: u32) -> Option<char> {
    let stat = std::fs::read_to_string(format!("/proc/{pid}/stat")).ok()?;
    let after_comm = stat.rfind(')')? + 1;
    stat[after_comm..].split_whitespace().next()?.chars().next()
}

#[test]
fn unreaped_child_is_counted_as_zombie() {
    let mut child = Command::new("true").spawn().expect("spawn `true`");
    let pid = child.id();

    // The child exits at once; until we wait on it, it stays a zombie.
    let deadline = Instant::now() + Duration::from_secs(5);
    while proc_state(pid) != Some('Z') {
        assert!(Instant::now() < deadline, "child {pid} never became a zombie");
        thread::sleep(Duration::from_millis(10));
    }

    let census = CensusProbe::new(SysinfoTaskSource::default()).sample();

    child.wait().expect("reap child");

    assert!(census.zombie >= 1, "zombie child not counted: {census:?}");
    assert!(census.total >= 2);
    assert!(census.is_consistent());
}

#[test]
fn live_census_is_consistent() {
    let census = CensusProbe::new(SysinfoTaskSource::default()).sample();
    assert!(census.total > 0);
    assert!(census.is_consistent());
}
