//! Native functions and the native call stack

use crate::descriptor::PropertyDescriptor;
use crate::error::{BoxError, BoxResult};
use crate::object::ObjectRef;
use crate::realm::Realm;
use crate::value::{PropertyKey, Value};
use std::cell::RefCell;
use std::rc::Rc;

/// `[[Call]]` behavior: `(realm, this, args)`
pub type CallFn = dyn Fn(&Realm, &Value, &[Value]) -> BoxResult<Value>;

/// `[[Construct]]` behavior: `(realm, args, new_target)`
pub type ConstructFn = dyn Fn(&Realm, &[Value], &ObjectRef) -> BoxResult<Value>;

/// Maximum depth of nested native calls
pub const MAX_CALL_DEPTH: usize = 512;

/// Function behavior attached to a callable object
pub(crate) struct FunctionData {
    name: Rc<str>,
    call: Rc<CallFn>,
    construct: Option<Rc<ConstructFn>>,
}

impl FunctionData {
    pub(crate) fn new(name: &str, call: Rc<CallFn>, construct: Option<Rc<ConstructFn>>) -> Self {
        Self {
            name: Rc::from(name),
            call,
            construct,
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn is_constructor(&self) -> bool {
        self.construct.is_some()
    }

    pub(crate) fn call(&self, realm: &Realm, this: &Value, args: &[Value]) -> BoxResult<Value> {
        let _frame = Frame::enter(self.name.clone())?;
        (self.call)(realm, this, args)
    }

    pub(crate) fn construct(
        &self,
        realm: &Realm,
        args: &[Value],
        new_target: &ObjectRef,
    ) -> BoxResult<Value> {
        let Some(construct) = &self.construct else {
            return Err(BoxError::type_error(format!("{} is not a constructor", self.name)));
        };
        let _frame = Frame::enter(self.name.clone())?;
        construct(realm, args, new_target)
    }
}

/// Create a function object with `length` and `name` own properties
pub(crate) fn make_function(
    function_prototype: Option<ObjectRef>,
    name: &str,
    length: u32,
    call: Rc<CallFn>,
    construct: Option<Rc<ConstructFn>>,
) -> ObjectRef {
    let func = ObjectRef::with_function(function_prototype, FunctionData::new(name, call, construct));
    let props = [
        ("length", Value::Number(length as f64)),
        ("name", Value::string(name)),
    ];
    for (key, value) in props {
        // Fresh object: the definitions cannot conflict
        let _ = func.define_own_property(
            PropertyKey::from(key),
            PropertyDescriptor::data(value, false, false, true),
        );
    }
    func
}

thread_local! {
    static CALL_STACK: RefCell<Vec<Rc<str>>> = const { RefCell::new(Vec::new()) };
}

/// An active entry on the native call stack, popped on drop
pub(crate) struct Frame {
    _private: (),
}

impl Frame {
    /// Push `name`, failing once the stack is [`MAX_CALL_DEPTH`] deep
    pub(crate) fn enter(name: Rc<str>) -> BoxResult<Frame> {
        let depth = CALL_STACK.with(|stack| stack.borrow().len());
        if depth >= MAX_CALL_DEPTH {
            return Err(BoxError::range_error("Maximum call stack size exceeded"));
        }
        CALL_STACK.with(|stack| stack.borrow_mut().push(name));
        Ok(Frame { _private: () })
    }
}

impl Drop for Frame {
    fn drop(&mut self) {
        CALL_STACK.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

/// Snapshot of the native call stack, innermost frame first
pub(crate) fn capture_stack() -> Vec<String> {
    CALL_STACK.with(|stack| stack.borrow().iter().rev().map(|name| name.to_string()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frames_are_popped() {
        {
            let _outer = Frame::enter(Rc::from("outer")).unwrap();
            let _inner = Frame::enter(Rc::from("inner")).unwrap();
            assert_eq!(capture_stack(), vec!["inner", "outer"]);
        }
        assert!(capture_stack().is_empty());
    }

    #[test]
    fn test_errors_capture_the_stack() {
        let _frame = Frame::enter(Rc::from("toFixed")).unwrap();
        let err = BoxError::range_error("digits");
        assert_eq!(err.stack(), ["toFixed".to_string()]);
    }

    #[test]
    fn test_depth_limit() {
        let mut frames = Vec::new();
        for _ in 0..MAX_CALL_DEPTH {
            frames.push(Frame::enter(Rc::from("f")).unwrap());
        }
        let err = Frame::enter(Rc::from("f")).err().unwrap();
        assert_eq!(err.name(), "RangeError");
        drop(frames);
        assert!(Frame::enter(Rc::from("f")).is_ok());
    }

    #[test]
    fn test_make_function_defines_length_and_name() {
        let call: Rc<CallFn> = Rc::new(|_, _, _| Ok(Value::Undefined));
        let func = make_function(None, "parse", 2, call, None);
        assert!(func.is_callable());
        assert!(!func.is_constructor());
        let length = func.get_own_property(&PropertyKey::from("length")).unwrap().unwrap();
        assert_eq!(length.value, Some(Value::from(2)));
        assert_eq!(length.configurable, Some(true));
        assert_eq!(length.writable, Some(false));
    }
}
