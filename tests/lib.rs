extern crate ftp_directory;

use ftp_directory::{ConnectionConfig, Strategy};

// Needs an FTP server on 127.0.0.1:21 that accepts anonymous writes.
#[test]
#[ignore]
fn test_ftp() {
    let config = ConnectionConfig::new("127.0.0.1").credentials("anonymous", "rust-ftp@github.com");
    let mut strategy = Strategy::connect(config).unwrap();

    {
        let mut dir = strategy.directory();
        assert!(dir.make("test_dir"));
        assert!(dir.make("test_dir/nested"));
        assert!(dir.exists("test_dir"));
        assert!(dir.change("test_dir"));
        assert!(dir.current().ends_with("/test_dir/"));
        assert_eq!(dir.contents(None), Some(vec!["nested".to_owned()]));

        assert!(dir.change(".."));
        dir.delete("test_dir", false);
        assert!(!dir.exists("test_dir"));
    }

    assert!(strategy.close().is_ok());
}
