use crate::scope::Scope;
use crate::string::Name;
use crate::types::TypeId;
use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

/// Host data attached to instances of native classes.
pub type NativePayload = Rc<RefCell<dyn Any>>;

#[derive(Debug)]
pub struct ClassBase {
    name: Name,
    type_id: TypeId,
    accessor: Name,
    /// Holds methods and member defaults. Instances are seeded from it.
    class_scope: Scope,
    /// Detached definition scope the class scope hangs from.
    captured: Option<Scope>,
}

impl ClassBase {
    pub fn new(
        name: Name,
        type_id: TypeId,
        accessor: Name,
        class_scope: Scope,
        captured: Option<Scope>,
    ) -> Rc<Self> {
        Rc::new(Self {
            name,
            type_id,
            accessor,
            class_scope,
            captured,
        })
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn accessor(&self) -> &Name {
        &self.accessor
    }

    pub fn class_scope(&self) -> &Scope {
        &self.class_scope
    }

    pub fn captured(&self) -> Option<&Scope> {
        self.captured.as_ref()
    }
}

pub struct ClassInstance {
    class: Rc<ClassBase>,
    scope: Scope,
    native: RefCell<Option<NativePayload>>,
}

impl ClassInstance {
    pub fn new(class: Rc<ClassBase>, scope: Scope) -> Self {
        Self {
            class,
            scope,
            native: RefCell::new(None),
        }
    }

    /// Attaches host data. Native constructors call this on their receiver.
    pub fn set_native(&self, payload: NativePayload) {
        *self.native.borrow_mut() = Some(payload);
    }

    pub fn class(&self) -> &Rc<ClassBase> {
        &self.class
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn native(&self) -> Option<NativePayload> {
        self.native.borrow().clone()
    }

    /// Independent copy: members are duplicated, the native payload is shared.
    pub fn duplicate(&self) -> Rc<ClassInstance> {
        Rc::new(ClassInstance {
            class: Rc::clone(&self.class),
            scope: self.scope.duplicate(),
            native: RefCell::new(self.native()),
        })
    }
}

impl std::fmt::Debug for ClassInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassInstance")
            .field("class", self.class.name())
            .field("native", &self.native.borrow().is_some())
            .finish()
    }
}
