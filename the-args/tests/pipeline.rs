use std::{
  collections::HashMap,
  sync::Mutex,
};

use futures_util::FutureExt;
use the_args::{
  ArgsConfig,
  ArgumentSpec,
  Arguments,
  CriticalError,
  Entity,
  Error,
  IntegerOptions,
  MessageCatalog,
  MultipleOptions,
  NodeOptions,
  Pipeline,
  StringOptions,
  TypeNode,
  UserError,
  Value,
};

// A tiny guild: user names mapped to ids.
struct Guild {
  members: HashMap<String, u64>,
}

impl Guild {
  fn new() -> Self {
    Self {
      members: [("alice", 1), ("bob", 2)]
        .into_iter()
        .map(|(name, id)| (name.to_string(), id))
        .collect(),
    }
  }
}

fn integer(options: NodeOptions) -> TypeNode<Guild> {
  TypeNode::integer(IntegerOptions::DEFAULT, options).expect("valid integer options")
}

fn string(options: NodeOptions) -> TypeNode<Guild> {
  TypeNode::string(StringOptions::DEFAULT, options).expect("valid string options")
}

fn member(options: NodeOptions) -> TypeNode<Guild> {
  TypeNode::<Guild>::lookup(
    "member",
    |raw, guild| {
      async move {
        let id = guild.members.get(raw).copied();
        Ok(id.map(|id| Value::Entity(Entity::new(raw, id))))
      }
      .boxed()
    },
    options,
  )
}

fn with_default(default: impl Into<Value>) -> NodeOptions {
  NodeOptions {
    default: Some(default.into()),
    ..NodeOptions::DEFAULT
  }
}

fn variadic() -> NodeOptions {
  NodeOptions {
    infinite: true,
    ..NodeOptions::DEFAULT
  }
}

fn arguments(nodes: Vec<TypeNode<Guild>>) -> Arguments<Guild> {
  Arguments::new(nodes.into_iter().map(ArgumentSpec::from).collect())
    .expect("valid argument list")
}

#[tokio::test]
async fn arity_with_a_defaultable_tail() {
  let args = arguments(vec![
    integer(NodeOptions::DEFAULT),
    integer(NodeOptions::DEFAULT),
    integer(with_default(0i64)),
  ]);
  let pipeline = Pipeline::default();
  let guild = Guild::new();

  assert_eq!(
    pipeline.run(&args, "1", &guild).await,
    Err(Error::User(UserError::ArgumentsSize {
      size: 1,
      min:  2,
      max:  Some(3),
    }))
  );
  assert_eq!(
    pipeline.run(&args, "1 2", &guild).await,
    Ok(vec![Value::Integer(1), Value::Integer(2), Value::Integer(0)])
  );
  assert_eq!(
    pipeline.run(&args, "1 2 3", &guild).await,
    Ok(vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)])
  );
  assert!(matches!(
    pipeline.run(&args, "1 2 3 4", &guild).await,
    Err(Error::User(UserError::ArgumentsSize { size: 4, .. }))
  ));
}

#[tokio::test]
async fn variadic_tail_collects_a_list() {
  let args = arguments(vec![string(NodeOptions::DEFAULT), integer(variadic())]);
  let pipeline = Pipeline::default();
  let guild = Guild::new();

  assert_eq!(
    pipeline.run(&args, "sum 1 2 3 4", &guild).await,
    Ok(vec![Value::from("sum"), Value::from(vec![1i64, 2, 3, 4])])
  );
  assert_eq!(
    pipeline.run(&args, "sum 1", &guild).await,
    Ok(vec![Value::from("sum"), Value::from(vec![1i64])])
  );
  assert_eq!(
    pipeline.run(&args, "sum", &guild).await,
    Err(Error::User(UserError::ArgumentsSize {
      size: 1,
      min:  2,
      max:  None,
    }))
  );
  assert_eq!(
    pipeline.run(&args, "sum 1 x 3", &guild).await,
    Err(Error::User(UserError::IncorrectType {
      value:    "x".into(),
      typename: "integer".into(),
    }))
  );
}

#[tokio::test]
async fn union_prefers_the_first_alternative() {
  let either = TypeNode::union(
    vec![integer(NodeOptions::DEFAULT), string(NodeOptions::DEFAULT)],
    NodeOptions::DEFAULT,
  )
  .unwrap();
  let args = arguments(vec![either]);
  let guild = Guild::new();

  assert_eq!(
    Pipeline::default().run(&args, "7", &guild).await,
    Ok(vec![Value::Integer(7)])
  );
}

#[tokio::test]
async fn every_invalid_argument_is_reported() {
  let args = arguments(vec![integer(NodeOptions::DEFAULT), member(NodeOptions::DEFAULT)]);
  let guild = Guild::new();

  let err = Pipeline::default()
    .run(&args, "seven carol", &guild)
    .await
    .unwrap_err();
  assert_eq!(
    err,
    Error::User(UserError::Multiple {
      errors: vec![
        UserError::IncorrectType {
          value:    "seven".into(),
          typename: "integer".into(),
        },
        UserError::IncorrectType {
          value:    "carol".into(),
          typename: "member".into(),
        },
      ],
    })
  );

  let catalog = MessageCatalog::english().unwrap();
  let Error::User(err) = err else {
    unreachable!()
  };
  assert_eq!(
    err.render(&catalog, "en"),
    "2 errors occurred:\n'seven' is not a valid integer\n'carol' is not a valid member"
  );
}

#[tokio::test]
async fn entities_come_from_the_context() {
  let args = arguments(vec![member(NodeOptions::DEFAULT)]);
  let guild = Guild::new();

  let values = Pipeline::default().run(&args, "bob", &guild).await.unwrap();
  let entity = values[0].as_entity().expect("an entity");
  assert_eq!(entity.name(), "bob");
  assert_eq!(entity.downcast_ref::<u64>(), Some(&2));
}

#[tokio::test]
async fn multiple_inside_a_pipeline() {
  let ids = TypeNode::multiple(
    MultipleOptions {
      separator: ",".into(),
      ..Default::default()
    },
    integer(NodeOptions::DEFAULT),
    NodeOptions::DEFAULT,
  )
  .unwrap();
  let args = arguments(vec![ids, string(with_default("none"))]);
  let guild = Guild::new();

  assert_eq!(
    Pipeline::default().run(&args, "1,2,3 'a reason'", &guild).await,
    Ok(vec![Value::from(vec![1i64, 2, 3]), Value::from("a reason")])
  );
  assert_eq!(
    Pipeline::default().run(&args, "1,x,3", &guild).await,
    Err(Error::User(UserError::Multiple {
      errors: vec![UserError::IncorrectType {
        value:    "x".into(),
        typename: "integer".into(),
      }],
    }))
  );
}

#[tokio::test]
async fn critical_errors_abort_the_run() {
  let offline = TypeNode::<Guild>::lookup(
    "member",
    |_, _| {
      async {
        Err(CriticalError::LookupFailed {
          name:   "member".into(),
          reason: "directory unavailable".into(),
        })
      }
      .boxed()
    },
    NodeOptions::DEFAULT,
  );
  let args = arguments(vec![integer(NodeOptions::DEFAULT), offline]);
  let guild = Guild::new();

  let err = Pipeline::default()
    .run(&args, "x alice", &guild)
    .await
    .unwrap_err();
  assert!(err.is_critical());
}

// A directory whose lookups take as many scheduler turns as the name's
// configured delay, recording the order in which they finish.
struct Directory {
  delays:   HashMap<String, usize>,
  finished: Mutex<Vec<String>>,
}

fn delayed_member() -> TypeNode<Directory> {
  TypeNode::<Directory>::lookup(
    "member",
    |raw, directory| {
      async move {
        let delay = directory.delays.get(raw).copied().unwrap_or_default();
        for _ in 0..delay {
          tokio::task::yield_now().await;
        }
        directory.finished.lock().unwrap().push(raw.to_string());
        Ok(Some(Value::from(raw)))
      }
      .boxed()
    },
    NodeOptions::DEFAULT,
  )
}

#[tokio::test]
async fn values_keep_argument_order() {
  let directory = Directory {
    delays:   [("slow", 8), ("medium", 3), ("fast", 0)]
      .into_iter()
      .map(|(name, delay)| (name.to_string(), delay))
      .collect(),
    finished: Mutex::new(Vec::new()),
  };
  let args = Arguments::new(vec![
    ArgumentSpec::new(delayed_member()),
    ArgumentSpec::new(delayed_member()),
    ArgumentSpec::new(delayed_member()),
  ])
  .unwrap();

  let values = Pipeline::default()
    .run(&args, "slow medium fast", &directory)
    .await
    .unwrap();
  assert_eq!(values, [
    Value::from("slow"),
    Value::from("medium"),
    Value::from("fast")
  ]);
  assert_eq!(*directory.finished.lock().unwrap(), ["fast", "medium", "slow"]);
}

#[tokio::test]
async fn configured_pipeline() {
  let config = ArgsConfig::from_toml(
    r#"
    extractor = "basic"
    allow-extra-arguments = true
    "#,
  )
  .unwrap();
  let pipeline = Pipeline::from_config(&config);
  let args = arguments(vec![string(NodeOptions::DEFAULT)]);
  let guild = Guild::new();

  assert_eq!(
    pipeline.run(&args, "'quoted words' ignored", &guild).await,
    Ok(vec![Value::from("'quoted")])
  );
}

#[test]
fn blocking_callers() {
  let args = arguments(vec![integer(with_default(10i64))]);
  let pipeline = Pipeline::default();
  let guild = Guild::new();

  assert_eq!(
    pipeline.parse_blocking(&args, "", &guild),
    Ok(vec![Value::Integer(10)])
  );
  assert_eq!(
    pipeline.parse_blocking(&args, "  4 ", &guild),
    Ok(vec![Value::Integer(4)])
  );
}
