use assert_cmd::prelude::*; // Add methods on commands
use predicates::prelude::*;
use std::path::{PathBuf,Path};
use std::process::Command; // Run programs
use tempfile;
type STDRESULT = Result<(),Box<dyn std::error::Error>>;

const HAMLET: &str = "Who's there?\r\nNay, answer me: stand, and unfold yourself.\r\nLong live the king!\r\n";

// Write enough text to the temporary directory to make the dictionary do some work.
fn make_text(temp_dir: &tempfile::TempDir,name: &str) -> Result<PathBuf,Box<dyn std::error::Error>> {
    let txt = HAMLET.repeat(200);
    let path = temp_dir.path().join(name);
    std::fs::write(&path,txt)?;
    Ok(path)
}

fn pack(in_path: &Path,out_path: &Path,code_length: &str) -> STDRESULT {
    Command::cargo_bin("ceym")?
        .arg(in_path)
        .arg("-o").arg(out_path)
        .arg("-C").arg(code_length)
        .assert()
        .success()
        .stderr(predicate::str::contains("packed"));
    Ok(())
}

fn unpack(in_path: &Path,out_path: &Path,code_length: &str) -> STDRESULT {
    Command::cargo_bin("ceym")?
        .arg("-u")
        .arg(in_path)
        .arg("-o").arg(out_path)
        .arg("-C").arg(code_length)
        .assert()
        .success()
        .stderr(predicate::str::contains("unpacked"));
    Ok(())
}

#[test]
fn pack_and_unpack() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let in_path = make_text(&temp_dir,"hamlet.txt")?;
    for code_length in ["9","12","16"] {
        let packed_path = temp_dir.path().join(["hamlet_",code_length,".ceym"].concat());
        let unpacked_path = temp_dir.path().join(["hamlet_",code_length,".txt"].concat());
        pack(&in_path,&packed_path,code_length)?;
        unpack(&packed_path,&unpacked_path,code_length)?;
        let original = std::fs::read(&in_path)?;
        assert!(std::fs::read(&packed_path)?.len() < original.len());
        assert_eq!(original,std::fs::read(&unpacked_path)?);
    }
    Ok(())
}

#[test]
fn default_names() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let in_path = make_text(&temp_dir,"hamlet.txt")?;
    Command::cargo_bin("ceym")?
        .arg(&in_path)
        .assert()
        .success();
    let packed_path = temp_dir.path().join("hamlet.txt.ceym");
    assert!(packed_path.exists());
    Command::cargo_bin("ceym")?
        .arg("--unpack")
        .arg(&packed_path)
        .assert()
        .success();
    let unpacked_path = temp_dir.path().join("hamlet.txt.u");
    assert_eq!(std::fs::read(&in_path)?,std::fs::read(&unpacked_path)?);
    Ok(())
}

#[test]
fn empty_file() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let in_path = temp_dir.path().join("empty");
    std::fs::write(&in_path,b"")?;
    let packed_path = temp_dir.path().join("empty.ceym");
    pack(&in_path,&packed_path,"12")?;
    assert_eq!(std::fs::read(&packed_path)?.len(),0);
    let unpacked_path = temp_dir.path().join("empty.u");
    unpack(&packed_path,&unpacked_path,"12")?;
    assert_eq!(std::fs::read(&unpacked_path)?.len(),0);
    Ok(())
}

#[test]
fn bad_code_length() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let in_path = make_text(&temp_dir,"hamlet.txt")?;
    for code_length in ["8","25"] {
        Command::cargo_bin("ceym")?
            .arg(&in_path)
            .arg("--code-length").arg(code_length)
            .assert()
            .failure()
            .stderr(predicate::str::contains("code width"));
    }
    Ok(())
}

#[test]
fn missing_input() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    Command::cargo_bin("ceym")?
        .arg(temp_dir.path().join("nothing.txt"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot open"));
    Ok(())
}

#[test]
fn corrupt_input() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    // 9 bit codes 97 then 300, the second cannot exist yet
    let in_path = temp_dir.path().join("bad.ceym");
    std::fs::write(&in_path,hex::decode("6158020000")?)?;
    Command::cargo_bin("ceym")?
        .arg("-u")
        .arg(&in_path)
        .arg("-C").arg("9")
        .assert()
        .failure()
        .stderr(predicate::str::contains("corrupt stream"));
    Ok(())
}

#[test]
fn refuse_same_path() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let in_path = make_text(&temp_dir,"hamlet.txt")?;
    Command::cargo_bin("ceym")?
        .arg(&in_path)
        .arg("-o").arg(&in_path)
        .assert()
        .failure();
    Ok(())
}

#[test]
fn default_name_without_packed_ext() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let in_path = make_text(&temp_dir,"hamlet.txt")?;
    let packed_path = temp_dir.path().join("hamlet.bin");
    pack(&in_path,&packed_path,"12")?;
    Command::cargo_bin("ceym")?
        .arg("-u")
        .arg(&packed_path)
        .assert()
        .success();
    let unpacked_path = temp_dir.path().join("hamlet.bin.u");
    assert_eq!(std::fs::read(&in_path)?,std::fs::read(&unpacked_path)?);
    Ok(())
}

#[test]
fn overwrite_declined() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let in_path = make_text(&temp_dir,"hamlet.txt")?;
    let out_path = temp_dir.path().join("hamlet.txt.ceym");
    std::fs::write(&out_path,"keep me")?;
    assert_cmd::Command::cargo_bin("ceym")?
        .arg(&in_path)
        .write_stdin("n\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("operation aborted"));
    assert_eq!(std::fs::read(&out_path)?,b"keep me".to_vec());
    Ok(())
}

#[test]
fn overwrite_accepted() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let in_path = make_text(&temp_dir,"hamlet.txt")?;
    let out_path = temp_dir.path().join("hamlet.txt.ceym");
    std::fs::write(&out_path,"stale")?;
    assert_cmd::Command::cargo_bin("ceym")?
        .arg(&in_path)
        .write_stdin("y\n")
        .assert()
        .success();
    let unpacked_path = temp_dir.path().join("hamlet.txt.u");
    unpack(&out_path,&unpacked_path,"12")?;
    assert_eq!(std::fs::read(&in_path)?,std::fs::read(&unpacked_path)?);
    Ok(())
}
