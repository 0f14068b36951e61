//! Common source code fixtures for tests.

pub const CONFIG_SCHEMA: &str = r#"schema Config {
  string host
  number port = 8080
  boolean tls
  @cloud
  string arn
}
"#;

pub const WEB_COMPONENT: &str = r#"component WebServer {
  input string name
  input number replicas = 1
  output string endpoint = "http://${name}"
}
"#;

pub const SHADOWING: &str = r#"var x = 1
fun f(number y) {
  var x = y
  return x
}
var z = x
"#;

pub const BRANCHES: &str = r#"fun pick(boolean c) {
  if c {
    var t = 1
    println(t)
  } else {
    var t = 2
    println(t)
  }
  return 0
}
"#;

pub const COMMENTED_OUT: &str = r#"// var unused = 1
/*
import Bucket from "aws.kite"
resource Config c {}
while true {
}
*/
var string used = "x"
output string result = used
"#;
